//! Color constants for the TUI.

use ratatui::style::Color;

use crate::sim::policy::Strategy;
use crate::sim::types::Action;

/// SOC gauge color when high (>= 50%).
pub const SOC_HIGH: Color = Color::Green;
/// SOC gauge color when medium (>= 20%).
pub const SOC_MID: Color = Color::Yellow;
/// SOC gauge color when low (< 20%).
pub const SOC_LOW: Color = Color::Red;
pub const HEADER_FG: Color = Color::White;
pub const HEADER_BG: Color = Color::DarkGray;
pub const FOOTER_FG: Color = Color::DarkGray;
/// Winner marker in the comparison panel.
pub const BEST: Color = Color::Magenta;
pub const ERROR: Color = Color::Red;

/// Line color of each strategy in the SOC chart.
pub fn strategy_color(strategy: Strategy) -> Color {
    match strategy {
        Strategy::TariffAvoidance => Color::Blue,
        Strategy::PriceArbitrage => Color::Yellow,
        Strategy::CarbonMinimizer => Color::Green,
        Strategy::Blended => Color::Cyan,
    }
}

pub fn action_color(action: Action) -> Color {
    match action {
        Action::Charge => Color::Green,
        Action::Discharge => Color::Red,
        Action::Idle => Color::Gray,
    }
}

/// Returns a color based on the battery state of charge.
pub fn soc_color(soc: f32) -> Color {
    if soc >= 0.5 {
        SOC_HIGH
    } else if soc >= 0.2 {
        SOC_MID
    } else {
        SOC_LOW
    }
}
