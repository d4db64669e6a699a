use crate::model::MaintenanceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    ThickSolid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::ThickSolid => "thick-solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub border: BorderStyle,
    pub ansi: &'static str,
}

pub const ANSI_RESET: &str = "\x1b[0m";

impl StatusStyle {
    /// Wraps `text` in this style's terminal color when `enabled`.
    pub fn paint(&self, text: &str, enabled: bool) -> String {
        if enabled {
            format!("{}{}{}", self.ansi, text, ANSI_RESET)
        } else {
            text.to_string()
        }
    }
}

pub fn status_style(status: MaintenanceStatus) -> StatusStyle {
    match status {
        MaintenanceStatus::Overdue => StatusStyle {
            label: "Overdue",
            color: "#dc3545",
            border: BorderStyle::ThickSolid,
            ansi: "\x1b[1;31m",
        },
        MaintenanceStatus::Pending => StatusStyle {
            label: "Pending",
            color: "#ffc107",
            border: BorderStyle::Dashed,
            ansi: "\x1b[33m",
        },
        MaintenanceStatus::Completed => StatusStyle {
            label: "Completed",
            color: "#28a745",
            border: BorderStyle::Solid,
            ansi: "\x1b[32m",
        },
        MaintenanceStatus::Cancelled => StatusStyle {
            label: "Cancelled",
            color: "#6c757d",
            border: BorderStyle::Dotted,
            ansi: "\x1b[38;5;244m",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{BorderStyle, status_style};
    use crate::model::MaintenanceStatus;
    use std::collections::HashSet;

    #[test]
    fn every_status_has_a_distinct_color() {
        let colors: HashSet<_> = MaintenanceStatus::ALL
            .into_iter()
            .map(|status| status_style(status).color)
            .collect();
        assert_eq!(colors.len(), MaintenanceStatus::ALL.len());
    }

    #[test]
    fn overdue_gets_the_heaviest_border() {
        assert_eq!(
            status_style(MaintenanceStatus::Overdue).border,
            BorderStyle::ThickSolid
        );
        assert_eq!(status_style(MaintenanceStatus::Pending).border.as_str(), "dashed");
    }

    #[test]
    fn paint_only_colors_when_enabled() {
        let style = status_style(MaintenanceStatus::Pending);
        assert_eq!(style.paint("3", false), "3");
        assert_eq!(style.paint("3", true), "\x1b[33m3\x1b[0m");
    }
}
