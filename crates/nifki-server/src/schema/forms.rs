//! The save form and its validation.
//!
//! Every field has an explicit, ordered list of validators. A field's
//! validators run in order and stop at the first error, so each field
//! reports at most one problem. Which problem the user sees is then chosen
//! by a fixed priority over all fields (see [`FormErrors::first_error`]).

use nifki_core::{is_valid_page_name, GameProperties, PageName};
use nifki_storage::PageStore;

use crate::config::SecretKey;
use crate::csrf;
use crate::schema::views::FormValues;

/// The eight bytes every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Uploads must be strictly smaller than this many bytes.
pub const MAX_UPLOAD_BYTES: usize = 102_400;

/// Shown whenever any of the numeric fields fails.
pub const NUMERIC_FIELDS_MESSAGE: &str = "The width, height and frame rate must all be integers.";

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadedFile {
    pub filename: String,
    /// At most [`MAX_UPLOAD_BYTES`] bytes; longer uploads are cut short.
    pub data: Vec<u8>,
}

/// The save form exactly as submitted. `None` means the part was absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveForm {
    pub name: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub ms_per_frame: Option<String>,
    pub debug: bool,
    pub source: Option<String>,
    pub newpage: Option<String>,
    /// The "upload" button was pressed rather than "save".
    pub upload: bool,
    pub uploaded_image: Option<UploadedFile>,
    pub csrf_token: Option<String>,
}

/// Form fields in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Width,
    Height,
    MsPerFrame,
    Debug,
    Source,
    NewPage,
    Upload,
    UploadedImage,
    CsrfToken,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Width,
        Field::Height,
        Field::MsPerFrame,
        Field::Debug,
        Field::Source,
        Field::NewPage,
        Field::Upload,
        Field::UploadedImage,
        Field::CsrfToken,
    ];

    /// The part name used in the HTML form.
    pub fn form_name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Width => "width",
            Field::Height => "height",
            Field::MsPerFrame => "msPerFrame",
            Field::Debug => "debug",
            Field::Source => "source",
            Field::NewPage => "newpage",
            Field::Upload => "upload",
            Field::UploadedImage => "uploadedImage",
            Field::CsrfToken => "csrf_token",
        }
    }

    pub fn from_form_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.form_name() == name)
    }

    fn is_numeric(self) -> bool {
        matches!(self, Field::Width | Field::Height | Field::MsPerFrame)
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    NotInteger,
    InvalidPageName(String),
    PageExists(String),
    UploadMissing,
    NotPng,
    TooLarge,
    CsrfMissing,
    CsrfInvalid,
}

impl FieldError {
    pub fn message(&self) -> String {
        match self {
            FieldError::Required => "This field is required.".to_string(),
            FieldError::NotInteger => "Not a valid integer value.".to_string(),
            FieldError::InvalidPageName(name) => format!(
                "Your changes have not been saved because '{name}' is not allowed as a \
                 page name. Page names must start with a letter, must contain only \
                 letters and digits, must not be entirely capital letters, and must \
                 have at least three characters and at most twenty."
            ),
            FieldError::PageExists(name) => format!(
                "Your changes have not been saved because a page called '{name}' \
                 already exists."
            ),
            FieldError::UploadMissing => "Upload file not provided.".to_string(),
            FieldError::NotPng => "Images must be in PNG format.".to_string(),
            FieldError::TooLarge => "Image files must be smaller than 100K.".to_string(),
            FieldError::CsrfMissing => "The CSRF token is missing.".to_string(),
            FieldError::CsrfInvalid => "The CSRF token is invalid.".to_string(),
        }
    }
}

/// All failures of one submission, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors(Vec<(Field, FieldError)>);

impl FormErrors {
    fn single(field: Field, error: FieldError) -> Self {
        FormErrors(vec![(field, error)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, e)| e)
    }

    /// The one message shown to the user.
    ///
    /// Any numeric field error wins and is reported as one combined message.
    /// Otherwise the first failing field in declaration order is reported;
    /// declaration order puts the upload and the form token last.
    pub fn first_error(&self) -> Option<String> {
        if self.0.iter().any(|(field, _)| field.is_numeric()) {
            return Some(NUMERIC_FIELDS_MESSAGE.to_string());
        }
        self.0.first().map(|(_, error)| error.message())
    }
}

/// What validators may consult besides the form itself.
pub struct ValidationContext<'a> {
    /// The page the form was opened on.
    pub page: &'a PageName,
    pub store: &'a dyn PageStore,
    pub secret_key: &'a SecretKey,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSave {
    /// Where the page is saved; equals the current page unless renaming.
    pub target: PageName,
    pub source: String,
    pub properties: GameProperties,
    /// Set when the upload button was pressed. Only the image is stored.
    pub upload: Option<UploadedFile>,
}

type Validator = fn(&SaveForm, Field, &ValidationContext<'_>) -> Option<FieldError>;

/// The validator table.
fn validators(field: Field) -> &'static [Validator] {
    match field {
        Field::Width | Field::Height | Field::MsPerFrame => &[required, integer],
        Field::Source => &[required],
        Field::NewPage => &[required, page_name_available],
        Field::UploadedImage => &[png_upload],
        Field::CsrfToken => &[csrf_token],
        Field::Name | Field::Debug | Field::Upload => &[],
    }
}

impl SaveForm {
    /// Text value of a field, if submitted.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Width => self.width.as_deref(),
            Field::Height => self.height.as_deref(),
            Field::MsPerFrame => self.ms_per_frame.as_deref(),
            Field::Source => self.source.as_deref(),
            Field::NewPage => self.newpage.as_deref(),
            Field::CsrfToken => self.csrf_token.as_deref(),
            Field::Debug | Field::Upload | Field::UploadedImage => None,
        }
    }

    /// The submitted values, for showing the form again unsaved.
    pub fn values(&self) -> FormValues {
        let text = |field| self.text(field).unwrap_or_default().to_string();
        FormValues {
            name: text(Field::Name),
            width: text(Field::Width),
            height: text(Field::Height),
            ms_per_frame: text(Field::MsPerFrame),
            debug: self.debug,
            source: text(Field::Source),
            newpage: text(Field::NewPage),
        }
    }

    /// The rename target, when the submitted name is a usable page name.
    pub fn rename_target(&self) -> Option<PageName> {
        PageName::parse(self.newpage.as_deref()?).ok()
    }

    /// Runs every field's validators.
    pub fn errors(&self, ctx: &ValidationContext<'_>) -> FormErrors {
        let mut errors = Vec::new();
        for field in Field::ALL {
            let first = validators(field)
                .iter()
                .find_map(|validate| validate(self, field, ctx));
            if let Some(error) = first {
                errors.push((field, error));
            }
        }
        FormErrors(errors)
    }

    /// Validates the submission and converts it into typed values.
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> Result<ValidSave, FormErrors> {
        let errors = self.errors(ctx);
        if !errors.is_empty() {
            return Err(errors);
        }

        let int = |field| parse_int(self.text(field)?);
        let numbers = (int(Field::Width), int(Field::Height), int(Field::MsPerFrame));
        let (Some(width), Some(height), Some(frame_interval_ms)) = numbers else {
            return Err(FormErrors::single(Field::Width, FieldError::NotInteger));
        };
        let newpage = self.newpage.clone().unwrap_or_default();
        let Ok(target) = PageName::parse(newpage.clone()) else {
            let error = FieldError::InvalidPageName(newpage);
            return Err(FormErrors::single(Field::NewPage, error));
        };

        Ok(ValidSave {
            target,
            source: self.source.clone().unwrap_or_default(),
            properties: GameProperties {
                tagline: self.name.clone().unwrap_or_default(),
                width,
                height,
                frame_interval_ms,
                debug: self.debug,
            },
            upload: if self.upload {
                self.uploaded_image.clone()
            } else {
                None
            },
        })
    }
}

fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

fn required(form: &SaveForm, field: Field, _ctx: &ValidationContext<'_>) -> Option<FieldError> {
    match form.text(field) {
        Some(text) if !text.is_empty() => None,
        _ => Some(FieldError::Required),
    }
}

fn integer(form: &SaveForm, field: Field, _ctx: &ValidationContext<'_>) -> Option<FieldError> {
    match form.text(field).and_then(parse_int) {
        Some(_) => None,
        None => Some(FieldError::NotInteger),
    }
}

fn page_name_available(
    form: &SaveForm,
    field: Field,
    ctx: &ValidationContext<'_>,
) -> Option<FieldError> {
    let newpage = form.text(field)?;
    if newpage == ctx.page.as_str() {
        return None;
    }
    if !is_valid_page_name(newpage) {
        return Some(FieldError::InvalidPageName(newpage.to_string()));
    }
    match PageName::parse(newpage) {
        Ok(target) if ctx.store.exists(&target) => {
            Some(FieldError::PageExists(newpage.to_string()))
        }
        Ok(_) => None,
        Err(_) => Some(FieldError::InvalidPageName(newpage.to_string())),
    }
}

fn png_upload(form: &SaveForm, _field: Field, _ctx: &ValidationContext<'_>) -> Option<FieldError> {
    if !form.upload {
        return None;
    }
    let file = match &form.uploaded_image {
        Some(file) if !(file.filename.is_empty() && file.data.is_empty()) => file,
        _ => return Some(FieldError::UploadMissing),
    };
    if !file.data.starts_with(&PNG_SIGNATURE) {
        return Some(FieldError::NotPng);
    }
    if file.data.len() >= MAX_UPLOAD_BYTES {
        return Some(FieldError::TooLarge);
    }
    None
}

fn csrf_token(form: &SaveForm, field: Field, ctx: &ValidationContext<'_>) -> Option<FieldError> {
    match form.text(field) {
        None | Some("") => Some(FieldError::CsrfMissing),
        Some(token) if csrf::verify(ctx.secret_key, ctx.page, token) => None,
        Some(_) => Some(FieldError::CsrfInvalid),
    }
}
