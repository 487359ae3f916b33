use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::interaction::{Tooltip, TooltipRow, SHARE_BAR_WIDTH, TOOLTIP_HEADERS};
use crate::legend::{SizeLegend, LEGEND_TITLE};
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let inner = render_map(frame, app, chunks[0]);
    render_legend(frame, &app.legend, inner);
    render_filter(frame, app, inner);
    render_tooltip(frame, app.tooltip(), inner);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Brand Traffic by Country ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app.render_layers(inner.width as usize, inner.height as usize);
    frame.render_widget(MapWidget { layers }, inner);
    inner
}

/// Custom widget that renders the braille map layers
struct MapWidget {
    layers: MapLayers,
}

/// Render a braille canvas with a specific color, leaving blank cells untouched
fn render_canvas(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for row in 0..canvas.height().min(area.height as usize) {
        for col in 0..canvas.width().min(area.width as usize) {
            if let Some(ch) = canvas.cell(col, row) {
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: countries, hovered country, bubbles, hovered bubble
        render_canvas(&self.layers.countries, Color::DarkGray, area, buf);
        render_canvas(&self.layers.active_country, Color::Yellow, area, buf);
        render_canvas(&self.layers.bubbles, Color::Cyan, area, buf);
        render_canvas(&self.layers.active_bubble, Color::LightMagenta, area, buf);
    }
}

/// Size legend anchored to the bottom-left of the map
fn render_legend(frame: &mut Frame, legend: &SizeLegend, map: Rect) {
    let hint_style = Style::default().fg(Color::DarkGray);
    let layout = match legend.layout() {
        Some(layout) if legend.is_open() => layout,
        _ => {
            let text = " [g] legend ";
            let width = (text.len() as u16).min(map.width);
            let rect = Rect::new(map.x, map.bottom().saturating_sub(1), width, map.height.min(1));
            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(Span::styled(text, hint_style)), rect);
            return;
        }
    };

    let width = (layout.canvas.width().max(LEGEND_TITLE.len()) as u16 + 2).min(map.width);
    let height = (layout.canvas.height() as u16 + 2).min(map.height);
    let rect = Rect::new(map.x, map.bottom().saturating_sub(height), width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(hint_style)
        .title(Span::styled(LEGEND_TITLE, Style::default().fg(Color::White)));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    let buf = frame.buffer_mut();
    render_canvas(&layout.canvas, Color::Cyan, inner, buf);
    for (lx, ly, text) in &layout.labels {
        if *ly >= inner.height || *lx >= inner.width {
            continue;
        }
        let max_len = inner.width.saturating_sub(*lx) as usize;
        for (i, ch) in text.chars().take(max_len).enumerate() {
            buf[(inner.x + lx + i as u16, inner.y + ly)]
                .set_char(ch)
                .set_fg(Color::White);
        }
    }
}

/// Category selector anchored to the top-right of the map
fn render_filter(frame: &mut Frame, app: &App, map: Rect) {
    let dimension = &app.filter.category;
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}: ", dimension.label), Style::default().fg(Color::DarkGray)),
        Span::styled(
            dimension.selected.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ])];

    if app.filter_control.open {
        for option in &dimension.options {
            let selected = *option == dimension.selected;
            let marker = if selected { "▸ " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(format!("{marker}{option}"), style)));
        }
    }

    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let width = (content_width + 2).min(map.width);
    let height = (lines.len() as u16 + 2).min(map.height);
    let rect = Rect::new(map.right().saturating_sub(width), map.y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn share_bar(ratio: f64) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * SHARE_BAR_WIDTH as f64).round() as usize).min(SHARE_BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(SHARE_BAR_WIDTH - filled))
}

fn tooltip_row(row: &TooltipRow, share_width: usize) -> Row<'static> {
    Row::new(vec![
        Cell::from(Line::from(row.rank.clone()).alignment(Alignment::Right)),
        Cell::from(row.brand.clone()),
        Cell::from(Line::from(row.traffic.clone()).alignment(Alignment::Right)),
        Cell::from(Line::from(vec![
            Span::raw(format!("{:>share_width$} ", row.share)),
            Span::styled(share_bar(row.share_ratio), Style::default().fg(Color::Cyan)),
        ])),
    ])
}

/// Floating tooltip with the hovered country's top brands
fn render_tooltip(frame: &mut Frame, tooltip: &Tooltip, map: Rect) {
    let Some(content) = tooltip.content.as_ref().filter(|_| tooltip.visible) else {
        return;
    };

    let (w, h) = content.size();
    let (px, py) = tooltip.position;
    let x = (map.x as i32 + px).clamp(map.x as i32, map.right() as i32) as u16;
    let y = (map.y as i32 + py).clamp(map.y as i32, map.bottom() as i32) as u16;
    let rect = Rect::new(x, y, w.min(map.right() - x), h.min(map.bottom() - y));
    if rect.is_empty() {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Span::styled(
            content.country_name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        parts[0],
    );

    let [rank, brand, traffic, share] = content.column_widths();
    let share_block = (share + 1 + SHARE_BAR_WIDTH).max(TOOLTIP_HEADERS[3].len());
    let widths = [
        Constraint::Length(rank as u16),
        Constraint::Length(brand as u16),
        Constraint::Length(traffic as u16),
        Constraint::Length(share_block as u16),
    ];

    let header_style = Style::default().fg(Color::DarkGray);
    let header = Row::new(vec![
        Cell::from(TOOLTIP_HEADERS[0]),
        Cell::from(TOOLTIP_HEADERS[1]),
        Cell::from(Line::from(TOOLTIP_HEADERS[2]).alignment(Alignment::Right)),
        Cell::from(TOOLTIP_HEADERS[3]),
    ])
    .style(header_style);

    let footer = Row::new(vec![
        Cell::from(""),
        Cell::from("TOTAL"),
        Cell::from(Line::from(content.total.clone()).alignment(Alignment::Right)),
        Cell::from(format!("{:>share$}", "100%")),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = content.rows.iter().map(|r| tooltip_row(r, share)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .footer(footer)
        .column_spacing(1);
    frame.render_widget(table, parts[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let hovered = app
        .hovered()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_string());

    let status = Line::from(vec![
        Span::styled(" Zoom: ", label),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | Category: ", label),
        Span::styled(app.filter.category.selected.clone(), Style::default().fg(Color::Magenta)),
        Span::styled(" | Bubbles: ", label),
        Span::styled(app.bubble_count().to_string(), Style::default().fg(Color::Green)),
        Span::styled(" | Hover: ", label),
        Span::styled(hovered, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom [/]:category f:filter g:legend r:reset q:quit",
            label,
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(0.0), "░".repeat(SHARE_BAR_WIDTH));
        assert_eq!(share_bar(1.0), "█".repeat(SHARE_BAR_WIDTH));
        assert_eq!(share_bar(0.5).chars().filter(|&c| c == '█').count(), 5);
        assert_eq!(share_bar(0.5).chars().count(), SHARE_BAR_WIDTH);
    }
}
