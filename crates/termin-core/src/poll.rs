use crate::error::CoreError;

/// One poll per reaction glyph, and there are ten digit keycaps.
pub const MAX_OPTIONS: usize = 10;

/// Keycap emoji for an option index: the ASCII digit followed by
/// U+FE0F U+20E3 (variation selector + combining keycap).
pub fn option_glyph(index: usize) -> String {
    format!("{index}\u{fe0f}\u{20e3}")
}

/// A named scheduling poll.
///
/// Starts as a draft, becomes posted once its announcement message id is
/// assigned, and is addressable by name until the registry retires it.
#[derive(Debug, Clone)]
pub struct Poll {
    name: String,
    question: String,
    options: Vec<String>,
    posted_item_id: Option<String>,
}

impl Poll {
    /// Construct a draft poll. The announcement id is assigned later via
    /// [`Poll::mark_posted`].
    pub fn new(
        name: impl Into<String>,
        question: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("poll name is empty".into()));
        }
        if options.is_empty() {
            return Err(CoreError::InvalidArgument(
                "a poll needs at least one option".into(),
            ));
        }
        if options.len() > MAX_OPTIONS {
            return Err(CoreError::InvalidArgument(format!(
                "a poll supports at most {MAX_OPTIONS} options, got {}",
                options.len()
            )));
        }
        Ok(Self {
            name,
            question: question.into(),
            options,
            posted_item_id: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn option_at(&self, index: usize) -> Result<&str, CoreError> {
        self.options
            .get(index)
            .map(String::as_str)
            .ok_or(CoreError::IndexOutOfRange {
                index,
                len: self.options.len(),
            })
    }

    /// Id of the announcement message carrying this poll, if posted.
    pub fn posted_item_id(&self) -> Option<&str> {
        self.posted_item_id.as_deref()
    }

    pub fn is_posted(&self) -> bool {
        self.posted_item_id.is_some()
    }

    /// Transition draft -> posted. Assigned exactly once.
    pub fn mark_posted(&mut self, item_id: impl Into<String>) -> Result<(), CoreError> {
        if self.posted_item_id.is_some() {
            return Err(CoreError::IllegalState("poll is already posted"));
        }
        self.posted_item_id = Some(item_id.into());
        Ok(())
    }

    /// Announcement text: the question followed by one line per option,
    /// each prefixed with its positional keycap glyph.
    pub fn render(&self) -> String {
        let options = self
            .options
            .iter()
            .enumerate()
            .map(|(i, opt)| format!("{} **{opt}**", option_glyph(i)))
            .collect::<Vec<_>>()
            .join("\n");
        format!("*{}:*\n\n{options}", self.question)
    }
}
