/// Предел длины сообщения в Telegram.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Обрезает текст до `max_chars` символов по границе символа, с многоточием.
pub fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some(_) => {
            let keep = max_chars.saturating_sub(1);
            let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            format!("{}…", &text[..end])
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl Button {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Button::Callback { label: label.into(), data: data.into() }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url { label: label.into(), url: url.into() }
    }
}

/// Исходящее сообщение: текст и, при необходимости, inline-кнопки по рядам.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<Vec<Button>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), buttons: Vec::new() }
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        self.buttons.push(row);
        self
    }

    pub fn has_callback(&self, data: &str) -> bool {
        self.buttons.iter().flatten().any(|button| {
            matches!(button, Button::Callback { data: d, .. } if d == data)
        })
    }

    pub fn has_url(&self) -> bool {
        self.buttons
            .iter()
            .flatten()
            .any(|button| matches!(button, Button::Url { .. }))
    }

    /// Гарантирует, что текст пройдёт лимит Telegram.
    pub fn fit(mut self) -> Self {
        if self.text.chars().count() > MAX_MESSAGE_CHARS {
            self.text = clip(&self.text, MAX_MESSAGE_CHARS);
        }
        self
    }
}
