use anyhow::{bail, Context, Result};

use crate::core::models::{CropPoint, DisplayViewport, FeedingRow, FoodForm, ProductType};
use crate::core::orchestrators::{ReviewEdit, WizardMessage};

pub const HELP_TEXT: &str = r#"Commands:
  capture                      take a photo for the current step
  retry                        discard the last photo and text
  text <value>                 correct the recognised text
  confirm                      accept the text and move on
  skip                         leave the current field empty
  crop                         select the feeding table by hand
  point <x> <y>                add a corner in image pixels
  dpoint <x> <y> <vx> <vy> <vw> <vh>
                               add a corner picked on a scaled view
  clear-points                 remove all corners
  apply-crop                   crop to the selected corners
  cancel-crop                  leave manual crop
  set <field> <value>          edit brand|name|ingredients|barcode|type|form
  add-row <weight>|<amount>|<notes>
  edit-row <n> <weight>|<amount>|<notes>
  remove-row <n>
  clear-table-image            drop the cropped feeding table
  submit                       save the product
  new                          start over with an empty product
  search <name prefix>         look up saved products
  help                         show this text
  quit                         exit"#;

#[derive(Debug, Clone)]
pub enum UserCommand {
    Wizard(WizardMessage),
    Search(String),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<UserCommand> {
    let line = line.trim();
    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .map(|(keyword, rest)| (keyword, rest.trim()))
        .unwrap_or((line, ""));

    let message = match keyword.to_ascii_lowercase().as_str() {
        "" => bail!("Type a command, or `help` to list them"),
        "help" | "?" => return Ok(UserCommand::Help),
        "quit" | "exit" => return Ok(UserCommand::Quit),
        "search" => return Ok(UserCommand::Search(rest.to_string())),
        "capture" => WizardMessage::Capture,
        "retry" => WizardMessage::Retry,
        "text" => WizardMessage::EditPendingText(rest.to_string()),
        "confirm" => WizardMessage::Confirm,
        "skip" => WizardMessage::Skip,
        "crop" => WizardMessage::StartManualCrop,
        "point" => {
            let numbers = parse_numbers(rest, 2)?;
            WizardMessage::AddCropPoint(CropPoint::new(numbers[0], numbers[1]))
        }
        "dpoint" => {
            let numbers = parse_numbers(rest, 6)?;
            WizardMessage::AddDisplayCropPoint(
                CropPoint::new(numbers[0], numbers[1]),
                DisplayViewport::new(numbers[2], numbers[3], numbers[4], numbers[5]),
            )
        }
        "clear-points" => WizardMessage::ResetCropPoints,
        "apply-crop" => WizardMessage::ConfirmCrop,
        "cancel-crop" => WizardMessage::CancelCrop,
        "set" => WizardMessage::EditReviewField(parse_set(rest)?),
        "add-row" => WizardMessage::EditReviewField(ReviewEdit::AddFeedingRow(parse_row(rest))),
        "edit-row" => {
            let (index, row) = rest
                .split_once(char::is_whitespace)
                .context("Usage: edit-row <n> <weight>|<amount>|<notes>")?;
            WizardMessage::EditReviewField(ReviewEdit::UpdateFeedingRow(
                parse_row_number(index)?,
                parse_row(row),
            ))
        }
        "remove-row" => {
            WizardMessage::EditReviewField(ReviewEdit::RemoveFeedingRow(parse_row_number(rest)?))
        }
        "clear-table-image" => {
            WizardMessage::EditReviewField(ReviewEdit::ClearFeedingGuidelinesImage)
        }
        "submit" => WizardMessage::Submit,
        "new" | "reset" => WizardMessage::Reset,
        other => bail!("Unknown command `{}`, type `help` to list commands", other),
    };

    Ok(UserCommand::Wizard(message))
}

fn parse_numbers(text: &str, expected: usize) -> Result<Vec<f32>> {
    let numbers = text
        .split_whitespace()
        .map(|part| {
            part.parse::<f32>()
                .with_context(|| format!("`{}` is not a number", part))
        })
        .collect::<Result<Vec<_>>>()?;

    if numbers.len() != expected {
        bail!("Expected {} numbers, got {}", expected, numbers.len());
    }
    Ok(numbers)
}

fn parse_set(text: &str) -> Result<ReviewEdit> {
    let (field, value) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let value = value.trim().to_string();

    let edit = match field.to_ascii_lowercase().as_str() {
        "brand" => ReviewEdit::BrandName(value),
        "name" => ReviewEdit::ProductName(value),
        "ingredients" => ReviewEdit::Ingredients(value),
        "barcode" => ReviewEdit::BarcodeText(value),
        "type" => ReviewEdit::ProductType(value.parse::<ProductType>()?),
        "form" => ReviewEdit::FoodForm(value.parse::<FoodForm>()?),
        other => bail!(
            "Unknown field `{}`, expected brand, name, ingredients, barcode, type or form",
            other
        ),
    };
    Ok(edit)
}

fn parse_row(text: &str) -> FeedingRow {
    let mut cells = text.split('|').map(str::trim);
    FeedingRow::new(
        cells.next().unwrap_or_default(),
        cells.next().unwrap_or_default(),
        cells.next().unwrap_or_default(),
    )
}

/// Rows are numbered from 1 on screen.
fn parse_row_number(text: &str) -> Result<usize> {
    let number = text
        .trim()
        .parse::<usize>()
        .with_context(|| format!("`{}` is not a row number", text.trim()))?;
    if number == 0 {
        bail!("Rows are numbered from 1");
    }
    Ok(number - 1)
}
