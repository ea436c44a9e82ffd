//! Single product detail view.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::catalog::Product;
use crate::ui::theme::Theme;

pub fn draw_product_detail(frame: &mut Frame, area: Rect, product: &Product, theme: &Theme) {
  let block = Block::default()
    .title(format!(" {} ", product.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(theme.border));

  let mut lines = vec![
    Line::from(vec![
      Span::styled("Цена: ", Style::default().fg(theme.muted)),
      Span::styled(
        format!("{} ₽", product.price),
        Style::default().fg(theme.price).add_modifier(Modifier::BOLD),
      ),
    ]),
    Line::from(vec![
      Span::styled("Категория: ", Style::default().fg(theme.muted)),
      Span::styled(product.category.label(), Style::default().fg(theme.foreground)),
    ]),
  ];

  if product.is_new {
    lines.push(Line::from(Span::styled(
      "НОВИНКА",
      Style::default().fg(theme.badge_new).add_modifier(Modifier::BOLD),
    )));
  }

  lines.push(Line::default());
  lines.push(Line::from(Span::styled(
    product.description.clone(),
    Style::default().fg(theme.foreground),
  )));

  if !product.features.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
      "Особенности:",
      Style::default().fg(theme.muted),
    )));
    for feature in &product.features {
      lines.push(Line::from(Span::raw(format!("  • {}", feature))));
    }
  }

  if !product.image.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
      format!("Изображение: {}", product.image),
      Style::default().fg(theme.muted),
    )));
  }

  let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
  frame.render_widget(paragraph, area);
}
