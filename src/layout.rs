//! Page geometry: lengths, paper sizes, margins and PDF page boxes

use lopdf::Object;
use serde::{Deserialize, Serialize};

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// Media box for a page of this size anchored at the origin
    pub fn to_page_box(&self) -> PageBox {
        PageBox::new(0.0, 0.0, self.width.pt() as f32, self.height.pt() as f32)
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins from millimeter values
    pub fn from_mm(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top: Length::from_mm(top),
            bottom: Length::from_mm(bottom),
            left: Length::from_mm(left),
            right: Length::from_mm(right),
        }
    }
}

/// Margins the content renderer applies, split by first and following pages.
///
/// The letterhead artwork is taller on the first page, so the first page
/// leaves less room at the top than the rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub first: Margins,
    pub other: Margins,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            first: Margins::from_mm(21.0, 30.0, 24.0, 22.0),
            other: Margins::from_mm(25.0, 31.0, 24.0, 22.0),
        }
    }
}

/// A PDF rectangle such as /MediaBox, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    pub fn new(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        // Normalize so that width and height are never negative
        Self {
            llx: llx.min(urx),
            lly: lly.min(ury),
            urx: llx.max(urx),
            ury: lly.max(ury),
        }
    }

    /// Parse a 4-number PDF array. Returns None for anything else.
    pub fn from_object(object: &Object) -> Option<Self> {
        let array = object.as_array().ok()?;
        if array.len() != 4 {
            return None;
        }

        let nums: Vec<f32> = array
            .iter()
            .filter_map(|o| match o {
                Object::Integer(i) => Some(*i as f32),
                Object::Real(r) => Some(*r),
                _ => None,
            })
            .collect();

        if nums.len() != 4 {
            return None;
        }

        Some(Self::new(nums[0], nums[1], nums[2], nums[3]))
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Whether the box encloses a drawable area
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_mm(25.4);
        assert_eq!(len.mm(), 25.4);
        assert!((len.pt() - 72.0).abs() < 0.01);
    }

    #[test]
    fn test_a4_size() {
        let a4 = PageDimensions::a4();
        assert!((a4.width.pt() - 595.28).abs() < 0.1);
        assert!((a4.height.pt() - 841.89).abs() < 0.1);

        let page_box = a4.to_page_box();
        assert_eq!(page_box.llx, 0.0);
        assert!((page_box.width() - 595.28).abs() < 0.1);
    }

    #[test]
    fn test_default_margins_first_page_is_shorter() {
        let margins = PageMargins::default();
        assert_eq!(margins.first.top.mm(), 21.0);
        assert_eq!(margins.other.top.mm(), 25.0);
        assert_eq!(margins.first.left, margins.other.left);
    }

    #[test]
    fn test_page_box_from_mixed_numbers() {
        let obj = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.5),
            Object::Integer(842),
        ]);
        let page_box = PageBox::from_object(&obj).unwrap();
        assert_eq!(page_box.width(), 595.5);
        assert_eq!(page_box.height(), 842.0);
    }

    #[test]
    fn test_page_box_normalizes_inverted_corners() {
        let page_box = PageBox::new(612.0, 792.0, 0.0, 0.0);
        assert_eq!(page_box.llx, 0.0);
        assert_eq!(page_box.width(), 612.0);
        assert_eq!(page_box.height(), 792.0);
    }

    #[test]
    fn test_page_box_rejects_bad_arrays() {
        assert!(PageBox::from_object(&Object::Integer(1)).is_none());
        let short = Object::Array(vec![Object::Integer(0), Object::Integer(0)]);
        assert!(PageBox::from_object(&short).is_none());
        let names = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"A".to_vec()),
            Object::Integer(10),
        ]);
        assert!(PageBox::from_object(&names).is_none());
    }
}
