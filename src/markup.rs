pub fn render_calendar_shapes() -> String {
    CALENDAR_SHAPES.to_string()
}

pub fn render_arrow(direction: Direction) -> String {
    let points = match direction {
        Direction::Left => "10,5 3,12 10,19",
        Direction::Right => "4,5 11,12 4,19",
    };
    ARROW_SVG.replace("{{POINTS}}", points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

const CALENDAR_SHAPES: &str = r#"<rect x="3" y="4" width="18" height="18" rx="2" ry="2"></rect>
<line x1="16" y1="2" x2="16" y2="6"></line>
<line x1="8" y1="2" x2="8" y2="6"></line>
<line x1="3" y1="10" x2="21" y2="10"></line>"#;

const ARROW_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="14" height="24"
  viewBox="0 0 14 24" fill="none" stroke="currentColor"
  stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
  <polyline points="{{POINTS}}"></polyline>
</svg>"#;
