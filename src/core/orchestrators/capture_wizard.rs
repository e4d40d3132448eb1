use std::fmt;

use crate::core::models::{
    CaptureBuffer, CropError, CropPoint, DisplayViewport, FeedingRow, FieldKind, FoodForm,
    OcrTableResult, OcrTextResult, ProductRecord, ProductType, ValidationError, WizardError,
    WizardStep,
};
use crate::core::orchestrators::quad_cropper::QuadCropSession;
use crate::global_constants::LOG_TAG_WIZARD;

/// Tags one outbound request so its answer can be matched to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Capture,
    TextOcr,
    TableOcr,
    Save,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionMode {
    Capturing,
    ReviewingText,
    ManualCrop(QuadCropSession),
    Reviewing,
    Submitted,
}

impl SessionMode {
    pub fn name(&self) -> &'static str {
        match self {
            SessionMode::Capturing => "capturing",
            SessionMode::ReviewingText => "reviewing text",
            SessionMode::ManualCrop(_) => "cropping",
            SessionMode::Reviewing => "reviewing",
            SessionMode::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSessionState {
    pub current_step: WizardStep,
    pub pending_image: Option<CaptureBuffer>,
    pub pending_text: String,
    pub record: ProductRecord,
    pub mode: SessionMode,
}

impl Default for CaptureSessionState {
    fn default() -> Self {
        Self {
            current_step: WizardStep::first(),
            pending_image: None,
            pending_text: String::new(),
            record: ProductRecord::default(),
            mode: SessionMode::Capturing,
        }
    }
}

impl CaptureSessionState {
    /// True when the feeding table OCR found nothing and a manual crop of the
    /// held image is the way forward.
    pub fn is_awaiting_manual_crop(&self) -> bool {
        self.mode == SessionMode::Capturing
            && self.current_step == WizardStep::Field(FieldKind::FeedingGuidelines)
            && self.pending_image.is_some()
    }

    fn clear_pending(&mut self) {
        self.pending_image = None;
        self.pending_text.clear();
    }

    fn advance(&mut self) {
        let next_step = self.current_step.next();
        log::info!(
            "{} advancing from {:?} to {:?}",
            LOG_TAG_WIZARD,
            self.current_step,
            next_step
        );

        self.current_step = next_step;
        self.clear_pending();
        self.mode = match next_step {
            WizardStep::Review => SessionMode::Reviewing,
            WizardStep::Field(_) => SessionMode::Capturing,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewEdit {
    BrandName(String),
    ProductName(String),
    Ingredients(String),
    BarcodeText(String),
    ProductType(ProductType),
    FoodForm(FoodForm),
    AddFeedingRow(FeedingRow),
    UpdateFeedingRow(usize, FeedingRow),
    RemoveFeedingRow(usize),
    ClearFeedingGuidelinesImage,
}

#[derive(Clone)]
pub enum WizardMessage {
    Capture,
    Retry,
    Confirm,
    Skip,
    EditPendingText(String),
    StartManualCrop,
    AddCropPoint(CropPoint),
    AddDisplayCropPoint(CropPoint, DisplayViewport),
    ResetCropPoints,
    ConfirmCrop,
    CancelCrop,
    EditReviewField(ReviewEdit),
    Submit,
    Reset,
    CaptureCompleted(RequestToken, Result<Option<CaptureBuffer>, String>),
    TextExtracted(RequestToken, Result<OcrTextResult, String>),
    TableExtracted(RequestToken, Result<OcrTableResult, String>),
    SubmitCompleted(RequestToken, Result<(), String>),
}

impl fmt::Debug for WizardMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardMessage::Capture => write!(f, "Capture"),
            WizardMessage::Retry => write!(f, "Retry"),
            WizardMessage::Confirm => write!(f, "Confirm"),
            WizardMessage::Skip => write!(f, "Skip"),
            WizardMessage::EditPendingText(_) => write!(f, "EditPendingText"),
            WizardMessage::StartManualCrop => write!(f, "StartManualCrop"),
            WizardMessage::AddCropPoint(point) => write!(f, "AddCropPoint({:?})", point),
            WizardMessage::AddDisplayCropPoint(point, _) => {
                write!(f, "AddDisplayCropPoint({:?})", point)
            }
            WizardMessage::ResetCropPoints => write!(f, "ResetCropPoints"),
            WizardMessage::ConfirmCrop => write!(f, "ConfirmCrop"),
            WizardMessage::CancelCrop => write!(f, "CancelCrop"),
            WizardMessage::EditReviewField(edit) => write!(f, "EditReviewField({:?})", edit),
            WizardMessage::Submit => write!(f, "Submit"),
            WizardMessage::Reset => write!(f, "Reset"),
            WizardMessage::CaptureCompleted(token, result) => write!(
                f,
                "CaptureCompleted({:?}, {})",
                token,
                matches!(result, Ok(Some(_)))
            ),
            WizardMessage::TextExtracted(token, result) => {
                write!(f, "TextExtracted({:?}, {})", token, result.is_ok())
            }
            WizardMessage::TableExtracted(token, result) => write!(
                f,
                "TableExtracted({:?}, {:?})",
                token,
                result.as_ref().map(|table| table.rows.len())
            ),
            WizardMessage::SubmitCompleted(token, result) => {
                write!(f, "SubmitCompleted({:?}, {})", token, result.is_ok())
            }
        }
    }
}

/// Outbound work the caller must perform and answer with the matching result
/// message.
#[derive(Clone)]
pub enum WizardEffect {
    RequestCapture(RequestToken),
    ExtractText(RequestToken, CaptureBuffer),
    ExtractTable(RequestToken, CaptureBuffer),
    SaveRecord(RequestToken, ProductRecord),
}

impl fmt::Debug for WizardEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardEffect::RequestCapture(token) => write!(f, "RequestCapture({:?})", token),
            WizardEffect::ExtractText(token, image) => {
                write!(f, "ExtractText({:?}, {}x{})", token, image.width, image.height)
            }
            WizardEffect::ExtractTable(token, image) => {
                write!(f, "ExtractTable({:?}, {}x{})", token, image.width, image.height)
            }
            WizardEffect::SaveRecord(token, record) => {
                write!(f, "SaveRecord({:?}, {:?})", token, record.product_name)
            }
        }
    }
}

/// Guided capture session. All state changes go through [`CaptureWizard::update`].
pub struct CaptureWizard {
    session: CaptureSessionState,
    in_flight: Option<(RequestToken, RequestKind)>,
    last_token: u64,
}

impl Default for CaptureWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureWizard {
    pub fn new() -> Self {
        Self {
            session: CaptureSessionState::default(),
            in_flight: None,
            last_token: 0,
        }
    }

    pub fn session(&self) -> &CaptureSessionState {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn update(&mut self, message: WizardMessage) -> Result<Option<WizardEffect>, WizardError> {
        log::info!("{} Received message: {:?}", LOG_TAG_WIZARD, message);

        let is_result = matches!(
            message,
            WizardMessage::CaptureCompleted(..)
                | WizardMessage::TextExtracted(..)
                | WizardMessage::TableExtracted(..)
                | WizardMessage::SubmitCompleted(..)
        );
        if !is_result && !matches!(message, WizardMessage::Reset) && self.is_busy() {
            log::warn!("{} rejecting {:?} while a request is in flight", LOG_TAG_WIZARD, message);
            return Err(WizardError::Busy);
        }

        match message {
            WizardMessage::Capture => self.handle_capture(),
            WizardMessage::Retry => self.handle_retry(),
            WizardMessage::Confirm => self.handle_confirm(),
            WizardMessage::Skip => self.handle_skip(),
            WizardMessage::EditPendingText(text) => self.handle_edit_pending_text(text),
            WizardMessage::StartManualCrop => self.handle_start_manual_crop(),
            WizardMessage::AddCropPoint(point) => {
                self.with_crop_session("add a corner", |crop| crop.add_point(point))
            }
            WizardMessage::AddDisplayCropPoint(point, viewport) => self
                .with_crop_session("add a corner", |crop| {
                    crop.add_display_point(point, &viewport)
                }),
            WizardMessage::ResetCropPoints => self.with_crop_session("reset corners", |crop| {
                crop.reset_points();
                Ok(())
            }),
            WizardMessage::ConfirmCrop => self.handle_confirm_crop(),
            WizardMessage::CancelCrop => self.handle_cancel_crop(),
            WizardMessage::EditReviewField(edit) => self.handle_edit_review_field(edit),
            WizardMessage::Submit => self.handle_submit(),
            WizardMessage::Reset => self.handle_reset(),
            WizardMessage::CaptureCompleted(token, result) => {
                self.handle_capture_completed(token, result)
            }
            WizardMessage::TextExtracted(token, result) => {
                self.handle_text_extracted(token, result)
            }
            WizardMessage::TableExtracted(token, result) => {
                self.handle_table_extracted(token, result)
            }
            WizardMessage::SubmitCompleted(token, result) => {
                self.handle_submit_completed(token, result)
            }
        }
    }

    fn issue_request(&mut self, kind: RequestKind) -> RequestToken {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.in_flight = Some((token, kind));
        log::debug!("{} issued {:?} request {:?}", LOG_TAG_WIZARD, kind, token);
        token
    }

    /// Clears the in-flight slot if `token` answers it. Anything else is a
    /// stale answer to a request the session no longer waits for.
    fn accept_result(&mut self, token: RequestToken, kind: RequestKind) -> bool {
        if self.in_flight == Some((token, kind)) {
            self.in_flight = None;
            return true;
        }

        log::warn!(
            "{} discarding stale {:?} result for {:?} (waiting on {:?})",
            LOG_TAG_WIZARD,
            kind,
            token,
            self.in_flight
        );
        false
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        let state = match self.session.current_step {
            WizardStep::Field(field) => {
                format!("{} on step `{}`", self.session.mode.name(), field.title())
            }
            WizardStep::Review => self.session.mode.name().to_string(),
        };
        log::warn!("{} `{}` rejected while {}", LOG_TAG_WIZARD, action, state);
        WizardError::InvalidTransition { action, state }
    }

    fn handle_capture(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        let on_field = self.session.current_step.field().is_some();
        if self.session.mode != SessionMode::Capturing || !on_field {
            return Err(self.invalid("capture"));
        }

        let token = self.issue_request(RequestKind::Capture);
        Ok(Some(WizardEffect::RequestCapture(token)))
    }

    fn handle_capture_completed(
        &mut self,
        token: RequestToken,
        result: Result<Option<CaptureBuffer>, String>,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if !self.accept_result(token, RequestKind::Capture) {
            return Ok(None);
        }

        let image = match result {
            Ok(Some(image)) => image,
            Ok(None) => {
                log::error!("{} capture source returned no image", LOG_TAG_WIZARD);
                return Err(WizardError::Capture(
                    "the camera did not return an image".to_string(),
                ));
            }
            Err(error) => {
                log::error!("{} capture failed: {}", LOG_TAG_WIZARD, error);
                return Err(WizardError::Capture(error));
            }
        };

        log::info!(
            "{} captured {}x{} image for {:?}",
            LOG_TAG_WIZARD,
            image.width,
            image.height,
            self.session.current_step
        );

        match self.session.current_step {
            WizardStep::Field(FieldKind::ProductPhoto) => {
                self.session.record.product_image = Some(image);
                self.session.advance();
                Ok(None)
            }
            WizardStep::Field(FieldKind::FeedingGuidelines) => {
                self.session.pending_text.clear();
                self.session.pending_image = Some(image.clone());
                let token = self.issue_request(RequestKind::TableOcr);
                Ok(Some(WizardEffect::ExtractTable(token, image)))
            }
            WizardStep::Field(_) => {
                self.session.pending_text.clear();
                self.session.pending_image = Some(image.clone());
                let token = self.issue_request(RequestKind::TextOcr);
                Ok(Some(WizardEffect::ExtractText(token, image)))
            }
            WizardStep::Review => Err(self.invalid("capture")),
        }
    }

    fn handle_text_extracted(
        &mut self,
        token: RequestToken,
        result: Result<OcrTextResult, String>,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if !self.accept_result(token, RequestKind::TextOcr) {
            return Ok(None);
        }

        self.session.pending_text = match result {
            Ok(ocr) => ocr.text.trim().to_string(),
            Err(error) => {
                log::warn!(
                    "{} text OCR failed, falling back to manual entry: {}",
                    LOG_TAG_WIZARD,
                    error
                );
                String::new()
            }
        };
        self.session.mode = SessionMode::ReviewingText;
        Ok(None)
    }

    fn handle_table_extracted(
        &mut self,
        token: RequestToken,
        result: Result<OcrTableResult, String>,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if !self.accept_result(token, RequestKind::TableOcr) {
            return Ok(None);
        }

        let rows = match result {
            Ok(table) => table.rows,
            Err(error) => {
                log::warn!("{} table OCR failed: {}", LOG_TAG_WIZARD, error);
                Vec::new()
            }
        };

        if rows.is_empty() {
            log::info!(
                "{} no feeding table detected, manual crop available",
                LOG_TAG_WIZARD
            );
            return Ok(None);
        }

        log::info!("{} feeding table has {} rows", LOG_TAG_WIZARD, rows.len());
        self.session.record.set_feeding_rows(rows);
        self.session.advance();
        Ok(None)
    }

    fn handle_retry(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        let can_retry = match self.session.mode {
            SessionMode::ReviewingText => true,
            SessionMode::Capturing => self.session.pending_image.is_some(),
            _ => false,
        };
        if !can_retry {
            return Err(self.invalid("retry"));
        }

        self.session.clear_pending();
        self.session.mode = SessionMode::Capturing;
        Ok(None)
    }

    fn handle_edit_pending_text(
        &mut self,
        text: String,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if self.session.mode != SessionMode::ReviewingText {
            return Err(self.invalid("edit text"));
        }

        self.session.pending_text = text;
        Ok(None)
    }

    fn handle_confirm(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        let field = match (&self.session.mode, self.session.current_step) {
            (SessionMode::ReviewingText, WizardStep::Field(field)) if field.is_text_field() => {
                field
            }
            _ => return Err(self.invalid("confirm")),
        };

        let value = std::mem::take(&mut self.session.pending_text);
        log::info!("{} committing {} ({} chars)", LOG_TAG_WIZARD, field, value.len());
        self.session.record.set_text_field(field, value);
        self.session.advance();
        Ok(None)
    }

    fn handle_skip(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        let field = match (&self.session.mode, self.session.current_step) {
            (SessionMode::Capturing, WizardStep::Field(field))
                if field != FieldKind::ProductPhoto =>
            {
                field
            }
            _ => return Err(self.invalid("skip")),
        };
        log::info!("{} skipping {}", LOG_TAG_WIZARD, field);

        if field == FieldKind::FeedingGuidelines {
            self.session.record.set_feeding_rows(Vec::new());
        } else {
            self.session.record.set_text_field(field, String::new());
        }
        self.session.advance();
        Ok(None)
    }

    fn handle_start_manual_crop(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        if !self.session.is_awaiting_manual_crop() {
            return Err(self.invalid("manual crop"));
        }

        let image = match self.session.pending_image.take() {
            Some(image) => image,
            None => return Err(self.invalid("manual crop")),
        };
        self.session.mode = SessionMode::ManualCrop(QuadCropSession::new(image));
        Ok(None)
    }

    fn with_crop_session(
        &mut self,
        action: &'static str,
        apply: impl FnOnce(&mut QuadCropSession) -> Result<(), CropError>,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if let SessionMode::ManualCrop(crop) = &mut self.session.mode {
            apply(crop)?;
            return Ok(None);
        }
        Err(self.invalid(action))
    }

    fn handle_confirm_crop(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        let cropped = match &self.session.mode {
            SessionMode::ManualCrop(crop) => crop.crop()?,
            _ => return Err(self.invalid("crop")),
        };

        self.handle_crop_complete(cropped);
        Ok(None)
    }

    fn handle_crop_complete(&mut self, cropped: CaptureBuffer) {
        log::info!(
            "{} feeding guidelines stored as {}x{} image",
            LOG_TAG_WIZARD,
            cropped.width,
            cropped.height
        );
        self.session.record.set_feeding_image(cropped);
        self.session.advance();
    }

    fn handle_cancel_crop(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        if !matches!(self.session.mode, SessionMode::ManualCrop(_)) {
            return Err(self.invalid("cancel crop"));
        }

        if let SessionMode::ManualCrop(crop) =
            std::mem::replace(&mut self.session.mode, SessionMode::Capturing)
        {
            self.session.pending_image = Some(crop.into_source());
        }
        Ok(None)
    }

    fn handle_edit_review_field(
        &mut self,
        edit: ReviewEdit,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if self.session.mode != SessionMode::Reviewing {
            return Err(self.invalid("edit field"));
        }

        let record = &mut self.session.record;
        match edit {
            ReviewEdit::BrandName(value) => record.brand_name = value,
            ReviewEdit::ProductName(value) => record.product_name = value,
            ReviewEdit::Ingredients(value) => record.ingredients = value,
            ReviewEdit::BarcodeText(value) => record.barcode_text = value,
            ReviewEdit::ProductType(value) => record.product_type = value,
            ReviewEdit::FoodForm(value) => record.food_form = value,
            ReviewEdit::ClearFeedingGuidelinesImage => record.feeding_guidelines_image = None,
            ReviewEdit::AddFeedingRow(row) => {
                ensure_rows_editable(record)?;
                record.feeding_guidelines.push(row);
            }
            ReviewEdit::UpdateFeedingRow(index, row) => {
                ensure_rows_editable(record)?;
                let slot = record
                    .feeding_guidelines
                    .get_mut(index)
                    .ok_or_else(|| missing_row(index))?;
                *slot = row;
            }
            ReviewEdit::RemoveFeedingRow(index) => {
                ensure_rows_editable(record)?;
                if index >= record.feeding_guidelines.len() {
                    return Err(missing_row(index).into());
                }
                record.feeding_guidelines.remove(index);
            }
        }
        Ok(None)
    }

    fn handle_submit(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        if self.session.mode != SessionMode::Reviewing {
            return Err(self.invalid("submit"));
        }

        self.session.record.validate()?;

        let token = self.issue_request(RequestKind::Save);
        Ok(Some(WizardEffect::SaveRecord(
            token,
            self.session.record.clone(),
        )))
    }

    fn handle_submit_completed(
        &mut self,
        token: RequestToken,
        result: Result<(), String>,
    ) -> Result<Option<WizardEffect>, WizardError> {
        if !self.accept_result(token, RequestKind::Save) {
            return Ok(None);
        }

        match result {
            Ok(()) => {
                log::info!("{} product submitted", LOG_TAG_WIZARD);
                self.session.mode = SessionMode::Submitted;
                Ok(None)
            }
            Err(error) => {
                log::error!("{} submit failed, record kept: {}", LOG_TAG_WIZARD, error);
                Err(WizardError::Submit(error))
            }
        }
    }

    fn handle_reset(&mut self) -> Result<Option<WizardEffect>, WizardError> {
        if let Some((token, kind)) = self.in_flight.take() {
            log::info!(
                "{} reset abandons in-flight {:?} request {:?}",
                LOG_TAG_WIZARD,
                kind,
                token
            );
        }
        self.session = CaptureSessionState::default();
        Ok(None)
    }
}

fn ensure_rows_editable(record: &ProductRecord) -> Result<(), ValidationError> {
    if record.feeding_guidelines_image.is_some() {
        return Err(ValidationError::single(
            "feedingGuidelines",
            "cannot be edited while feedingGuidelinesImage is set",
        ));
    }
    Ok(())
}

fn missing_row(index: usize) -> ValidationError {
    ValidationError::single("feedingGuidelines", format!("has no row {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::capture_buffer::gradient_buffer;

    fn token_of(effect: &Option<WizardEffect>) -> RequestToken {
        match effect {
            Some(WizardEffect::RequestCapture(token))
            | Some(WizardEffect::ExtractText(token, _))
            | Some(WizardEffect::ExtractTable(token, _))
            | Some(WizardEffect::SaveRecord(token, _)) => *token,
            None => panic!("expected an effect"),
        }
    }

    fn capture_image(wizard: &mut CaptureWizard, image: CaptureBuffer) -> Option<WizardEffect> {
        let effect = wizard.update(WizardMessage::Capture).unwrap();
        let token = token_of(&effect);
        wizard
            .update(WizardMessage::CaptureCompleted(token, Ok(Some(image))))
            .unwrap()
    }

    fn scan_text(wizard: &mut CaptureWizard, text: &str) {
        let effect = capture_image(wizard, gradient_buffer(16, 16));
        let token = token_of(&effect);
        wizard
            .update(WizardMessage::TextExtracted(
                token,
                Ok(OcrTextResult {
                    text: text.to_string(),
                }),
            ))
            .unwrap();
    }

    fn scan_table(wizard: &mut CaptureWizard, rows: Vec<FeedingRow>) {
        let effect = capture_image(wizard, gradient_buffer(200, 120));
        let token = token_of(&effect);
        wizard
            .update(WizardMessage::TableExtracted(token, Ok(OcrTableResult { rows })))
            .unwrap();
    }

    fn wizard_at_review() -> CaptureWizard {
        let mut wizard = CaptureWizard::new();
        scan_text(&mut wizard, "Acme");
        wizard.update(WizardMessage::Confirm).unwrap();
        scan_text(&mut wizard, "Chicken Bites");
        wizard.update(WizardMessage::Confirm).unwrap();
        wizard.update(WizardMessage::Skip).unwrap();
        scan_table(&mut wizard, vec![FeedingRow::new("5 kg", "100 g", "")]);
        wizard.update(WizardMessage::Skip).unwrap();
        capture_image(&mut wizard, gradient_buffer(8, 8));
        wizard
    }

    #[test]
    fn test_new_wizard_starts_capturing_brand() {
        let wizard = CaptureWizard::new();

        assert_eq!(wizard.session().current_step, WizardStep::Field(FieldKind::Brand));
        assert_eq!(wizard.session().mode, SessionMode::Capturing);
        assert!(!wizard.is_busy());
    }

    #[test]
    fn test_text_capture_puts_trimmed_ocr_text_up_for_review() {
        let mut wizard = CaptureWizard::new();

        scan_text(&mut wizard, "  Acme Pet Co\n");

        assert_eq!(wizard.session().mode, SessionMode::ReviewingText);
        assert_eq!(wizard.session().pending_text, "Acme Pet Co");
        assert!(wizard.session().pending_image.is_some());
        assert_eq!(wizard.session().current_step, WizardStep::Field(FieldKind::Brand));
    }

    #[test]
    fn test_failed_text_ocr_falls_back_to_empty_manual_entry() {
        let mut wizard = CaptureWizard::new();
        let effect = capture_image(&mut wizard, gradient_buffer(4, 4));

        wizard
            .update(WizardMessage::TextExtracted(
                token_of(&effect),
                Err("service unavailable".to_string()),
            ))
            .unwrap();
        wizard
            .update(WizardMessage::EditPendingText("Typed Brand".to_string()))
            .unwrap();
        wizard.update(WizardMessage::Confirm).unwrap();

        assert_eq!(wizard.session().record.brand_name, "Typed Brand");
    }

    #[test]
    fn test_capture_without_image_fails_and_leaves_state_untouched() {
        let mut wizard = CaptureWizard::new();
        let before = wizard.session().clone();
        let effect = wizard.update(WizardMessage::Capture).unwrap();

        let result = wizard.update(WizardMessage::CaptureCompleted(token_of(&effect), Ok(None)));

        assert!(matches!(result, Err(WizardError::Capture(_))));
        assert_eq!(wizard.session(), &before);
        assert!(!wizard.is_busy());
    }

    #[test]
    fn test_confirm_and_skip_visit_every_field_once() {
        let mut wizard = CaptureWizard::new();
        let mut visited = vec![];

        for index in 0..5 {
            visited.push(wizard.session().current_step);
            if index % 2 == 0 || wizard.session().current_step
                == WizardStep::Field(FieldKind::FeedingGuidelines)
            {
                wizard.update(WizardMessage::Skip).unwrap();
            } else {
                scan_text(&mut wizard, "value");
                wizard.update(WizardMessage::Confirm).unwrap();
            }
        }

        assert_eq!(
            visited,
            FieldKind::ALL[..5]
                .iter()
                .map(|field| WizardStep::Field(*field))
                .collect::<Vec<_>>()
        );
        assert_eq!(
            wizard.session().current_step,
            WizardStep::Field(FieldKind::ProductPhoto)
        );

        capture_image(&mut wizard, gradient_buffer(8, 8));

        assert_eq!(wizard.session().current_step, WizardStep::Review);
        assert_eq!(wizard.session().mode, SessionMode::Reviewing);
        assert!(wizard.session().record.product_image.is_some());
    }

    #[test]
    fn test_skip_is_rejected_on_product_photo() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..5 {
            wizard.update(WizardMessage::Skip).unwrap();
        }

        let result = wizard.update(WizardMessage::Skip);

        assert!(matches!(result, Err(WizardError::InvalidTransition { .. })));
        assert_eq!(
            wizard.session().current_step,
            WizardStep::Field(FieldKind::ProductPhoto)
        );
    }

    #[test]
    fn test_retry_clears_pending_and_keeps_step() {
        let mut wizard = CaptureWizard::new();
        scan_text(&mut wizard, "Acme");

        wizard.update(WizardMessage::Retry).unwrap();

        assert_eq!(wizard.session().mode, SessionMode::Capturing);
        assert!(wizard.session().pending_image.is_none());
        assert!(wizard.session().pending_text.is_empty());
        assert_eq!(wizard.session().current_step, WizardStep::Field(FieldKind::Brand));
    }

    #[test]
    fn test_retry_after_empty_table_discards_held_image() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }
        scan_table(&mut wizard, vec![]);

        wizard.update(WizardMessage::Retry).unwrap();

        assert_eq!(wizard.session().mode, SessionMode::Capturing);
        assert!(wizard.session().pending_image.is_none());
        assert!(!wizard.session().is_awaiting_manual_crop());
        assert_eq!(
            wizard.session().current_step,
            WizardStep::Field(FieldKind::FeedingGuidelines)
        );
    }

    #[test]
    fn test_retry_without_pending_capture_is_invalid() {
        let mut wizard = CaptureWizard::new();

        assert!(matches!(
            wizard.update(WizardMessage::Retry),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_second_capture_while_in_flight_is_busy() {
        let mut wizard = CaptureWizard::new();
        wizard.update(WizardMessage::Capture).unwrap();

        assert_eq!(wizard.update(WizardMessage::Capture).unwrap_err(), WizardError::Busy);
        assert_eq!(wizard.update(WizardMessage::Skip).unwrap_err(), WizardError::Busy);
    }

    #[test]
    fn test_ocr_in_flight_blocks_retry_and_confirm() {
        let mut wizard = CaptureWizard::new();
        capture_image(&mut wizard, gradient_buffer(4, 4));

        assert_eq!(wizard.update(WizardMessage::Retry).unwrap_err(), WizardError::Busy);
        assert_eq!(wizard.update(WizardMessage::Confirm).unwrap_err(), WizardError::Busy);
    }

    #[test]
    fn test_stale_ocr_result_after_reset_is_discarded() {
        let mut wizard = CaptureWizard::new();
        let effect = capture_image(&mut wizard, gradient_buffer(4, 4));
        let stale_token = token_of(&effect);

        wizard.update(WizardMessage::Reset).unwrap();
        wizard
            .update(WizardMessage::TextExtracted(
                stale_token,
                Ok(OcrTextResult {
                    text: "late".to_string(),
                }),
            ))
            .unwrap();

        assert_eq!(wizard.session(), &CaptureSessionState::default());
    }

    #[test]
    fn test_result_with_unknown_token_is_ignored() {
        let mut wizard = CaptureWizard::new();
        let effect = wizard.update(WizardMessage::Capture).unwrap();
        let RequestToken(issued) = token_of(&effect);

        wizard
            .update(WizardMessage::CaptureCompleted(
                RequestToken(issued + 10),
                Ok(Some(gradient_buffer(4, 4))),
            ))
            .unwrap();

        assert!(wizard.is_busy());
        assert!(wizard.session().pending_image.is_none());
    }

    #[test]
    fn test_detected_feeding_table_is_stored_and_step_advances() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }
        let rows = vec![
            FeedingRow::new("2-5 kg", "50-100 g", ""),
            FeedingRow::new("5-10 kg", "100-170 g", ""),
        ];

        scan_table(&mut wizard, rows.clone());

        assert_eq!(wizard.session().record.feeding_guidelines, rows);
        assert_eq!(wizard.session().current_step, WizardStep::Field(FieldKind::Barcode));
        assert_eq!(wizard.session().mode, SessionMode::Capturing);
    }

    #[test]
    fn test_empty_table_keeps_image_and_offers_manual_crop() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }

        scan_table(&mut wizard, vec![]);

        assert!(wizard.session().is_awaiting_manual_crop());
        assert_eq!(
            wizard.session().current_step,
            WizardStep::Field(FieldKind::FeedingGuidelines)
        );
    }

    #[test]
    fn test_manual_crop_stores_image_clears_rows_and_advances() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }
        scan_table(&mut wizard, vec![]);
        wizard.update(WizardMessage::StartManualCrop).unwrap();

        for (x, y) in [(10.0, 10.0), (110.0, 10.0), (110.0, 60.0), (10.0, 60.0)] {
            wizard
                .update(WizardMessage::AddCropPoint(CropPoint::new(x, y)))
                .unwrap();
        }
        wizard.update(WizardMessage::ConfirmCrop).unwrap();

        let record = &wizard.session().record;
        let cropped = record.feeding_guidelines_image.as_ref().unwrap();
        assert_eq!((cropped.width, cropped.height), (100, 50));
        assert_eq!(cropped.pixel_at(0, 0), gradient_buffer(200, 120).pixel_at(10, 10));
        assert!(record.feeding_guidelines.is_empty());
        assert_eq!(wizard.session().current_step, WizardStep::Field(FieldKind::Barcode));
        assert_eq!(wizard.session().mode, SessionMode::Capturing);
    }

    #[test]
    fn test_incomplete_crop_is_rejected_and_stays_in_manual_crop() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }
        scan_table(&mut wizard, vec![]);
        wizard.update(WizardMessage::StartManualCrop).unwrap();
        wizard
            .update(WizardMessage::AddCropPoint(CropPoint::new(1.0, 1.0)))
            .unwrap();
        let before = wizard.session().clone();

        let result = wizard.update(WizardMessage::ConfirmCrop);

        assert_eq!(
            result.unwrap_err(),
            WizardError::Crop(CropError::IncompletePolygon { points: 1 })
        );
        assert_eq!(wizard.session(), &before);
    }

    #[test]
    fn test_cancel_crop_returns_to_capturing_with_image_kept() {
        let mut wizard = CaptureWizard::new();
        for _ in 0..3 {
            wizard.update(WizardMessage::Skip).unwrap();
        }
        scan_table(&mut wizard, vec![]);
        wizard.update(WizardMessage::StartManualCrop).unwrap();

        wizard.update(WizardMessage::CancelCrop).unwrap();

        assert_eq!(wizard.session().mode, SessionMode::Capturing);
        assert!(wizard.session().is_awaiting_manual_crop());
        assert_eq!(
            wizard.session().current_step,
            WizardStep::Field(FieldKind::FeedingGuidelines)
        );
    }

    #[test]
    fn test_manual_crop_requires_an_empty_table_result() {
        let mut wizard = CaptureWizard::new();

        assert!(matches!(
            wizard.update(WizardMessage::StartManualCrop),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_review_edits_overwrite_record_fields() {
        let mut wizard = wizard_at_review();

        wizard
            .update(WizardMessage::EditReviewField(ReviewEdit::BrandName("Acme Co".to_string())))
            .unwrap();
        wizard
            .update(WizardMessage::EditReviewField(ReviewEdit::FoodForm(FoodForm::Wet)))
            .unwrap();
        wizard
            .update(WizardMessage::EditReviewField(ReviewEdit::AddFeedingRow(
                FeedingRow::new("10 kg", "180 g", ""),
            )))
            .unwrap();
        wizard
            .update(WizardMessage::EditReviewField(ReviewEdit::RemoveFeedingRow(0)))
            .unwrap();

        let record = &wizard.session().record;
        assert_eq!(record.brand_name, "Acme Co");
        assert_eq!(record.food_form, FoodForm::Wet);
        assert_eq!(record.feeding_guidelines, vec![FeedingRow::new("10 kg", "180 g", "")]);
    }

    #[test]
    fn test_removing_missing_row_names_feeding_guidelines() {
        let mut wizard = wizard_at_review();

        let result =
            wizard.update(WizardMessage::EditReviewField(ReviewEdit::RemoveFeedingRow(7)));

        match result {
            Err(WizardError::Validation(error)) => {
                assert_eq!(error.fields(), vec!["feedingGuidelines"])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_submit_with_empty_product_name_fails_validation_without_effect() {
        let mut wizard = wizard_at_review();
        wizard
            .update(WizardMessage::EditReviewField(ReviewEdit::ProductName(String::new())))
            .unwrap();

        let result = wizard.update(WizardMessage::Submit);

        assert!(matches!(result, Err(WizardError::Validation(_))));
        assert!(!wizard.is_busy());
        assert_eq!(wizard.session().mode, SessionMode::Reviewing);
    }

    #[test]
    fn test_failed_submit_keeps_record_and_allows_identical_retry() {
        let mut wizard = wizard_at_review();
        let first = wizard.update(WizardMessage::Submit).unwrap();
        let record_before = wizard.session().record.clone();

        let result = wizard.update(WizardMessage::SubmitCompleted(
            token_of(&first),
            Err("503".to_string()),
        ));

        assert_eq!(result.unwrap_err(), WizardError::Submit("503".to_string()));
        assert_eq!(wizard.session().mode, SessionMode::Reviewing);
        assert_eq!(wizard.session().record, record_before);

        let second = wizard.update(WizardMessage::Submit).unwrap();
        match (first, second) {
            (
                Some(WizardEffect::SaveRecord(_, first_record)),
                Some(WizardEffect::SaveRecord(_, second_record)),
            ) => assert_eq!(first_record, second_record),
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_submitted_session_only_accepts_reset() {
        let mut wizard = wizard_at_review();
        let effect = wizard.update(WizardMessage::Submit).unwrap();
        wizard
            .update(WizardMessage::SubmitCompleted(token_of(&effect), Ok(())))
            .unwrap();

        assert_eq!(wizard.session().mode, SessionMode::Submitted);
        assert!(wizard.update(WizardMessage::Submit).is_err());
        assert!(wizard.update(WizardMessage::Capture).is_err());

        wizard.update(WizardMessage::Reset).unwrap();

        assert_eq!(wizard.session(), &CaptureSessionState::default());
    }
}
