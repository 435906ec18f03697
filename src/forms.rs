use crate::dom::Node;

pub const CONTACT_FORM_ID: &str = "contact-form";
pub const EMAIL_FIELD_SELECTOR: &str = "input[name=\"email\"]";
pub const REPLY_TO_FIELD_SELECTOR: &str = "input[name=\"_replyto\"]";
pub const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
pub const FORM_GROUP_SELECTOR: &str = ".form-group";
pub const SENDING_LABEL: &str = "Sending...";
pub const FOCUSED_CLASS: &str = "focused";

/// Contact form posting to an external mail relay. The relay handles the response, so
/// this only prepares the request and marks the form busy.
pub struct ContactForm<N> {
    email: Option<N>,
    reply_to: Option<N>,
    submit: Option<N>,
}

impl<N: Node> ContactForm<N> {
    pub fn new(email: Option<N>, reply_to: Option<N>, submit: Option<N>) -> Self {
        Self {
            email,
            reply_to,
            submit,
        }
    }

    pub fn prepare_submission(&self) {
        if let (Some(email), Some(reply_to)) = (self.email.as_ref(), self.reply_to.as_ref()) {
            reply_to.set_value(&email.value().unwrap_or_default());
        }

        if let Some(submit) = self.submit.as_ref() {
            submit.set_text(SENDING_LABEL);
            submit.set_disabled(true);
        }
    }
}

/// Keeps a floating label raised while its field has focus or content.
pub struct FieldGroup<N> {
    group: N,
    input: N,
}

impl<N: Node> FieldGroup<N> {
    pub fn new(group: N, input: N) -> Self {
        let field = Self { group, input };
        if field.has_content() {
            field.group.set_class(FOCUSED_CLASS, true);
        }
        field
    }

    fn has_content(&self) -> bool {
        self.input
            .value()
            .map(|value| !value.is_empty())
            .unwrap_or(false)
    }

    pub fn handle_focus(&self) {
        self.group.set_class(FOCUSED_CLASS, true);
    }

    pub fn handle_blur(&self) {
        if !self.has_content() {
            self.group.set_class(FOCUSED_CLASS, false);
        }
    }
}
