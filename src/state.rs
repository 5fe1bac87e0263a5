//! Form state and the transitions that update it.
//!
//! `FormState` is never mutated in place: [`FormState::apply`] consumes the
//! current state and an [`Action`] and returns the next state. Time is passed
//! in through the actions so transitions stay deterministic.

use std::time::{Duration, Instant};

use crate::avatar::Avatar;
use crate::department::Department;
use crate::fields::{Field, SignatureFields};
use crate::format;

/// How long a success/failure label stays on the download button.
pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_secs(3);

/// Visual state of the download button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Generating,
    Success,
    Failed,
}

impl ButtonState {
    pub fn label(self) -> &'static str {
        match self {
            ButtonState::Idle => "Baixar Assinatura",
            ButtonState::Generating => "Gerando assinatura...",
            ButtonState::Success => "Assinatura baixada!",
            ButtonState::Failed => "Erro ao gerar assinatura",
        }
    }

    /// Background color as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            ButtonState::Idle | ButtonState::Generating => "#0266AF",
            ButtonState::Success => "#16A34A",
            ButtonState::Failed => "#DC2626",
        }
    }

    /// Success and failure are terminal and revert to idle after a delay.
    pub fn is_terminal(self) -> bool {
        matches!(self, ButtonState::Success | ButtonState::Failed)
    }
}

/// A state transition request.
#[derive(Debug, Clone)]
pub enum Action {
    /// Raw text typed into a field. Phone input is masked on the way in;
    /// department text is parsed against the official labels and ignored if
    /// it matches none.
    SetField(Field, String),
    SetDepartment(Option<Department>),
    SetAvatar(Avatar),
    ClearAvatar,
    ExportStarted,
    ExportFinished { ok: bool, at: Instant },
    Tick(Instant),
}

/// Everything the form shows, as one immutable value.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: SignatureFields,
    avatar: Option<Avatar>,
    button: ButtonState,
    revert_at: Option<Instant>,
    revert_delay: Duration,
    complete: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(DEFAULT_REVERT_DELAY)
    }
}

impl FormState {
    pub fn new(revert_delay: Duration) -> Self {
        Self {
            fields: SignatureFields::default(),
            avatar: None,
            button: ButtonState::Idle,
            revert_at: None,
            revert_delay,
            complete: false,
        }
    }

    /// Start from already collected fields, e.g. read from a JSON file.
    pub fn with_fields(fields: SignatureFields, revert_delay: Duration) -> Self {
        let mut state = Self::new(revert_delay);
        state.fields = SignatureFields {
            phone: format::format_phone(&fields.phone),
            ..fields
        };
        state.complete = state.fields.is_complete();
        state
    }

    pub fn fields(&self) -> &SignatureFields {
        &self.fields
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Download is enabled only while every field is filled and no export is
    /// running.
    pub fn can_download(&self) -> bool {
        self.complete && self.button != ButtonState::Generating
    }

    pub fn apply(self, action: Action) -> Self {
        let mut next = match action {
            Action::SetField(field, value) => self.with_field(field, value),
            Action::SetDepartment(department) => Self {
                fields: SignatureFields { department, ..self.fields },
                ..self
            },
            Action::SetAvatar(avatar) => Self { avatar: Some(avatar), ..self },
            Action::ClearAvatar => Self { avatar: None, ..self },
            Action::ExportStarted if self.can_download() => Self {
                button: ButtonState::Generating,
                revert_at: None,
                ..self
            },
            Action::ExportStarted => self,
            Action::ExportFinished { ok, at } => Self {
                button: if ok { ButtonState::Success } else { ButtonState::Failed },
                revert_at: Some(at + self.revert_delay),
                ..self
            },
            Action::Tick(now) => match self.revert_at {
                Some(deadline) if self.button.is_terminal() && now >= deadline => Self {
                    button: ButtonState::Idle,
                    revert_at: None,
                    ..self
                },
                _ => self,
            },
        };
        next.complete = next.fields.is_complete();
        next
    }

    fn with_field(self, field: Field, value: String) -> Self {
        let mut fields = self.fields.clone();
        match field {
            Field::Name => fields.name = value,
            Field::Role => fields.role = value,
            Field::Phone => fields.phone = format::format_phone(&value),
            Field::Address => fields.address = value,
            Field::Department => match Department::parse_optional(&value) {
                Ok(d) => fields.department = d,
                Err(_) => return self,
            },
        }
        Self { fields, ..self }
    }
}
