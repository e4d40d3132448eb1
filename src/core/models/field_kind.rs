use std::fmt;

/// One capturable field of a product label, in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Brand,
    ProductName,
    Ingredients,
    FeedingGuidelines,
    Barcode,
    ProductPhoto,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Brand,
        FieldKind::ProductName,
        FieldKind::Ingredients,
        FieldKind::FeedingGuidelines,
        FieldKind::Barcode,
        FieldKind::ProductPhoto,
    ];

    pub fn position(self) -> usize {
        match self {
            FieldKind::Brand => 0,
            FieldKind::ProductName => 1,
            FieldKind::Ingredients => 2,
            FieldKind::FeedingGuidelines => 3,
            FieldKind::Barcode => 4,
            FieldKind::ProductPhoto => 5,
        }
    }

    /// Fields whose value comes from plain-text OCR and is reviewed as text.
    pub fn is_text_field(self) -> bool {
        matches!(
            self,
            FieldKind::Brand | FieldKind::ProductName | FieldKind::Ingredients | FieldKind::Barcode
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            FieldKind::Brand => "Capture Brand",
            FieldKind::ProductName => "Capture Product Name",
            FieldKind::Ingredients => "Capture Ingredients",
            FieldKind::FeedingGuidelines => "Capture Feeding Guidelines",
            FieldKind::Barcode => "Capture Barcode",
            FieldKind::ProductPhoto => "Take Product Photo",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Brand => write!(f, "brandName"),
            FieldKind::ProductName => write!(f, "productName"),
            FieldKind::Ingredients => write!(f, "ingredients"),
            FieldKind::FeedingGuidelines => write!(f, "feedingGuidelines"),
            FieldKind::Barcode => write!(f, "barcodeText"),
            FieldKind::ProductPhoto => write!(f, "productImage"),
        }
    }
}

/// Where the wizard currently is: on a field, or on the terminal review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Field(FieldKind),
    Review,
}

impl WizardStep {
    pub fn first() -> Self {
        WizardStep::Field(FieldKind::Brand)
    }

    /// The step that follows this one. `Review` is its own successor.
    pub fn next(self) -> Self {
        match self {
            WizardStep::Field(field) => FieldKind::ALL
                .get(field.position() + 1)
                .copied()
                .map(WizardStep::Field)
                .unwrap_or(WizardStep::Review),
            WizardStep::Review => WizardStep::Review,
        }
    }

    pub fn field(self) -> Option<FieldKind> {
        match self {
            WizardStep::Field(field) => Some(field),
            WizardStep::Review => None,
        }
    }

    /// One-based position for "Step N of M" displays.
    pub fn number(self) -> usize {
        match self {
            WizardStep::Field(field) => field.position() + 1,
            WizardStep::Review => FieldKind::ALL.len() + 1,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Field(field) => field.title(),
            WizardStep::Review => "Review and Submit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_fields_in_order_then_review() {
        let mut step = WizardStep::first();
        let mut visited = vec![];

        while let WizardStep::Field(field) = step {
            visited.push(field);
            step = step.next();
        }

        assert_eq!(visited, FieldKind::ALL.to_vec());
        assert_eq!(step, WizardStep::Review);
    }

    #[test]
    fn test_review_is_its_own_successor() {
        assert_eq!(WizardStep::Review.next(), WizardStep::Review);
    }

    #[test]
    fn test_step_numbers_run_from_one_to_seven() {
        assert_eq!(WizardStep::first().number(), 1);
        assert_eq!(WizardStep::Field(FieldKind::ProductPhoto).number(), 6);
        assert_eq!(WizardStep::Review.number(), 7);
    }

    #[test]
    fn test_only_ocr_text_fields_are_text_fields() {
        assert!(FieldKind::Brand.is_text_field());
        assert!(FieldKind::Barcode.is_text_field());
        assert!(!FieldKind::FeedingGuidelines.is_text_field());
        assert!(!FieldKind::ProductPhoto.is_text_field());
    }

    #[test]
    fn test_display_uses_wire_field_names() {
        assert_eq!(FieldKind::Brand.to_string(), "brandName");
        assert_eq!(FieldKind::Barcode.to_string(), "barcodeText");
    }
}
