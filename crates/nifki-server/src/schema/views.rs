//! View models produced by [`crate::service::PageService`].
//!
//! Each outcome enum is the complete set of responses an operation can
//! produce; handlers map them one-to-one onto HTTP responses.

use nifki_core::{GameProperties, PageName};

/// Field values shown in the edit form, as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues {
    pub name: String,
    pub width: String,
    pub height: String,
    pub ms_per_frame: String,
    pub debug: bool,
    pub source: String,
    pub newpage: String,
}

impl FormValues {
    /// Values for a freshly opened editor.
    pub fn from_saved(page: &PageName, source: String, props: &GameProperties) -> Self {
        FormValues {
            name: props.tagline.clone(),
            width: props.width.to_string(),
            height: props.height.to_string(),
            ms_per_frame: props.frame_interval_ms.to_string(),
            debug: props.debug,
            source,
            newpage: page.to_string(),
        }
    }
}

/// The edit form for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditView {
    pub page: PageName,
    pub error_message: Option<String>,
    pub values: FormValues,
    /// Resource names, sorted.
    pub resources: Vec<String>,
    pub csrf_token: String,
}

/// Everything the player page needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub page: PageName,
    pub tagline: String,
    pub width: i64,
    pub height: i64,
    pub frame_interval_ms: i64,
    pub resources: Vec<String>,
    /// Varies the artifact URL so browsers never reuse a stale build.
    pub random: i64,
}

/// Result of opening the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Form(EditView),
    NoSuchPage(PageName),
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Validation failed, or an image was uploaded: show the form again.
    EditForm(EditView),
    /// Saved and built; go and play it.
    RedirectToPlay(PageName),
    /// Saved, but the compiler itself could not run.
    BuildToolError,
}

/// Result of a play request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    RenderGame(GameView),
    /// The last build failed; `text` is the wrapped diagnostic.
    ShowDiagnostics { page: PageName, text: String },
    /// Never built: send the visitor to the editor.
    RedirectToEditor(PageName),
}
