// src/strings.rs
//
// Localized guidance messages. Two catalogs for now, matching the
// locales the app ships; unknown language codes fall back to English.

use crate::types::GuidanceDirection;

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    pub no_crossing: &'static str,
    pub alert_left: &'static str,
    pub alert_right: &'static str,
    pub alert_straight: &'static str,
    pub go: &'static str,
    pub stop: &'static str,
}

impl MessageCatalog {
    pub fn english() -> Self {
        Self {
            no_crossing: "No crossing detected",
            alert_left: "Adjust to the left",
            alert_right: "Adjust to the right",
            alert_straight: "Walk straight ahead",
            go: "Go",
            stop: "Stop",
        }
    }

    pub fn traditional_chinese() -> Self {
        Self {
            no_crossing: "未偵測到行人穿越道",
            alert_left: "請向左修正",
            alert_right: "請向右修正",
            alert_straight: "請直行",
            go: "通行",
            stop: "停止",
        }
    }

    pub fn for_language(language: &str) -> Self {
        match language {
            "zh-TW" | "zh-rTW" => Self::traditional_chinese(),
            _ => Self::english(),
        }
    }

    pub fn direction(&self, direction: GuidanceDirection) -> &'static str {
        match direction {
            GuidanceDirection::Left => self.alert_left,
            GuidanceDirection::Right => self.alert_right,
            GuidanceDirection::Straight => self.alert_straight,
            GuidanceDirection::None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let catalog = MessageCatalog::for_language("fr");
        assert_eq!(catalog.go, MessageCatalog::english().go);
    }

    #[test]
    fn test_direction_none_is_empty() {
        let catalog = MessageCatalog::english();
        assert_eq!(catalog.direction(GuidanceDirection::None), "");
    }

    #[test]
    fn test_locales_share_shape() {
        let en = MessageCatalog::english();
        let tw = MessageCatalog::for_language("zh-TW");
        assert_ne!(en.no_crossing, tw.no_crossing);
        assert_ne!(en.stop, tw.stop);
    }
}
