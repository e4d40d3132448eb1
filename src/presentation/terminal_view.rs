use crate::core::models::{FieldKind, ProductRecord, StoredProduct, WizardStep};
use crate::core::orchestrators::quad_cropper::QUAD_CORNER_COUNT;
use crate::core::orchestrators::{CaptureSessionState, QuadCropSession, SessionMode};
use crate::global_constants::TOTAL_STEP_COUNT;

const NOT_SET: &str = "(not set)";

/// Renders the current wizard screen as plain text for the terminal.
pub struct TerminalView;

impl TerminalView {
    pub fn render_session(session: &CaptureSessionState) -> String {
        let mut lines = vec![
            String::new(),
            format!(
                "=== {} (Step {} of {}) ===",
                session.current_step.title(),
                session.current_step.number(),
                TOTAL_STEP_COUNT
            ),
        ];

        match &session.mode {
            SessionMode::Capturing => Self::render_capturing(session, &mut lines),
            SessionMode::ReviewingText => Self::render_reviewing_text(session, &mut lines),
            SessionMode::ManualCrop(crop) => Self::render_manual_crop(crop, &mut lines),
            SessionMode::Reviewing => {
                Self::render_record(&session.record, &mut lines);
                lines.push(
                    "Edit with `set`, `add-row`, `edit-row`, `remove-row`, then `submit`.".into(),
                );
            }
            SessionMode::Submitted => {
                lines.push("Product saved.".into());
                Self::render_record(&session.record, &mut lines);
                lines.push("Type `new` to scan another product.".into());
            }
        }

        lines.join("\n")
    }

    fn render_capturing(session: &CaptureSessionState, lines: &mut Vec<String>) {
        if session.is_awaiting_manual_crop() {
            lines.push("No feeding table detected in the photo.".into());
            lines.push(
                "Type `crop` to select the table by hand, `retry` to take another photo, or `skip`."
                    .into(),
            );
            return;
        }

        let skip_hint = match session.current_step {
            WizardStep::Field(FieldKind::ProductPhoto) => "",
            _ => ", or `skip` to leave it empty",
        };
        lines.push(format!("Type `capture` to take a photo{}.", skip_hint));
    }

    fn render_reviewing_text(session: &CaptureSessionState, lines: &mut Vec<String>) {
        if session.pending_text.is_empty() {
            lines.push("No text recognised.".into());
        } else {
            lines.push("Recognised text:".into());
            lines.extend(session.pending_text.lines().map(|line| format!("  {}", line)));
        }
        lines.push("Type `confirm` to accept, `text <value>` to correct it, or `retry`.".into());
    }

    fn render_manual_crop(crop: &QuadCropSession, lines: &mut Vec<String>) {
        let source = crop.source();
        lines.push(format!(
            "Manual crop over {}x{} photo, corners {}/{}:",
            source.width,
            source.height,
            crop.points().len(),
            QUAD_CORNER_COUNT
        ));
        lines.extend(
            crop.points()
                .iter()
                .enumerate()
                .map(|(index, point)| format!("  {}. ({:.0}, {:.0})", index + 1, point.x, point.y)),
        );

        if crop.is_complete() {
            lines.push(
                "Type `apply-crop` to use this region, or `clear-points` to start over.".into(),
            );
        } else {
            lines.push("Add corners clockwise from the top left with `point <x> <y>`.".into());
        }
    }

    fn render_record(record: &ProductRecord, lines: &mut Vec<String>) {
        lines.push(format!("  Brand:        {}", or_not_set(&record.brand_name)));
        lines.push(format!("  Product name: {}", or_not_set(&record.product_name)));
        lines.push(format!("  Ingredients:  {}", or_not_set(&record.ingredients)));
        lines.push(format!("  Barcode:      {}", or_not_set(&record.barcode_text)));
        lines.push(format!("  Type:         {}", record.product_type));
        lines.push(format!("  Form:         {}", record.food_form));
        lines.push(format!(
            "  Photo:        {}",
            describe_image(record.product_image.as_ref().map(|image| (image.width, image.height)))
        ));

        if let Some(image) = &record.feeding_guidelines_image {
            lines.push(format!(
                "  Feeding table: cropped image {}x{}",
                image.width, image.height
            ));
        } else if record.feeding_guidelines.is_empty() {
            lines.push(format!("  Feeding table: {}", NOT_SET));
        } else {
            lines.push("  Feeding table:".into());
            lines.extend(record.feeding_guidelines.iter().enumerate().map(|(index, row)| {
                let mut line = format!("    {}. {} -> {}", index + 1, row.weight, row.amount);
                if !row.notes.is_empty() {
                    line.push_str(&format!(" ({})", row.notes));
                }
                line
            }));
        }
    }

    pub fn render_search_results(name_prefix: &str, products: &[StoredProduct]) -> String {
        if products.is_empty() {
            return format!("No saved products match {:?}.", name_prefix);
        }

        let mut lines = vec![format!("Saved products matching {:?}:", name_prefix)];
        lines.extend(products.iter().map(|product| {
            format!(
                "  {} {} [{}]",
                or_not_set(&product.brand_name),
                or_not_set(&product.product_name),
                product.product_type
            )
        }));
        lines.join("\n")
    }

    pub fn render_error(error: &impl std::fmt::Display) -> String {
        format!("Error: {}", error)
    }
}

fn or_not_set(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SET
    } else {
        value
    }
}

fn describe_image(dimensions: Option<(u32, u32)>) -> String {
    match dimensions {
        Some((width, height)) => format!("{}x{}", width, height),
        None => NOT_SET.to_string(),
    }
}
