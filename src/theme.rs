use serde::{Deserialize, Serialize};

pub const SANS12: &str = "12px Verdana, sans-serif";
pub const SANS16: &str = "16px Verdana, sans-serif";
pub const BLACK: &str = "#000";
pub const WHITE: &str = "#fff";

/// Colors handed out to series that do not set their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub series_colors: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_palette()
    }
}

impl Theme {
    pub fn default_palette() -> Self {
        Self {
            series_colors: ["#d7df23", "#adc32b", "#799b28", "#4c7520"]
                .iter()
                .map(|color| color.to_string())
                .collect(),
        }
    }

    /// Round-robin palette lookup; black when the palette is empty.
    pub fn series_color(&self, index: usize) -> &str {
        if self.series_colors.is_empty() {
            return BLACK;
        }
        &self.series_colors[index % self.series_colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        let theme = Theme::default_palette();
        assert_eq!(theme.series_color(0), "#d7df23");
        assert_eq!(theme.series_color(4), "#d7df23");
        assert_eq!(theme.series_color(5), "#adc32b");
    }

    #[test]
    fn empty_palette_is_black() {
        let theme = Theme {
            series_colors: Vec::new(),
        };
        assert_eq!(theme.series_color(3), BLACK);
    }
}
