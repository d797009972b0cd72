use serde::{Deserialize, Serialize};

/// Rendering hint for the table outline. Bounds math always uses the
/// bounding rectangle regardless of shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Rectangle,
    Circle,
    Oval,
    Triangle,
}

impl TableShape {
    pub const ALL: [TableShape; 4] = [
        TableShape::Rectangle,
        TableShape::Circle,
        TableShape::Oval,
        TableShape::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Oval => "oval",
            Self::Triangle => "triangle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn next(self) -> Self {
        match self {
            Self::Rectangle => Self::Circle,
            Self::Circle => Self::Oval,
            Self::Oval => Self::Triangle,
            Self::Triangle => Self::Rectangle,
        }
    }
}

/// 3D tilt applied to the table when rendered, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOrientation {
    pub rotate_x: i32,
    pub rotate_y: i32,
    pub rotate_z: i32,
}

impl TableOrientation {
    pub fn new(rotate_x: i32, rotate_y: i32, rotate_z: i32) -> Self {
        Self {
            rotate_x,
            rotate_y,
            rotate_z,
        }
    }

    pub fn transform(&self) -> String {
        format!(
            "rotateX({}deg) rotateY({}deg) rotateZ({}deg)",
            self.rotate_x, self.rotate_y, self.rotate_z
        )
    }
}

/// Size limits enforced on every table resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableLimits {
    pub min_width: i32,
    pub min_length: i32,
    pub max_width: Option<i32>,
    pub max_length: Option<i32>,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self {
            min_width: 400,
            min_length: 300,
            max_width: None,
            max_length: None,
        }
    }
}

impl TableLimits {
    pub fn is_valid(&self) -> bool {
        self.min_width >= 1
            && self.min_length >= 1
            && self.max_width.map_or(true, |max| max >= self.min_width)
            && self.max_length.map_or(true, |max| max >= self.min_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_cycle_visits_every_shape() {
        let mut shape = TableShape::Rectangle;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(shape);
            shape = shape.next();
        }
        assert_eq!(seen, TableShape::ALL.to_vec());
        assert_eq!(shape, TableShape::Rectangle);
    }

    #[test]
    fn shape_parse_is_case_insensitive() {
        assert_eq!(TableShape::parse("Oval"), Some(TableShape::Oval));
        assert_eq!(TableShape::parse("hexagon"), None);
    }

    #[test]
    fn orientation_transform_string() {
        let orientation = TableOrientation::new(30, 0, -15);
        assert_eq!(
            orientation.transform(),
            "rotateX(30deg) rotateY(0deg) rotateZ(-15deg)"
        );
    }

    #[test]
    fn limits_reject_non_positive_minimum() {
        assert!(TableLimits::default().is_valid());
        let limits = TableLimits {
            min_width: 0,
            ..TableLimits::default()
        };
        assert!(!limits.is_valid());
    }
}
