//! Checkout form state machine
//!
//! A strictly linear sequence of required fields:
//! name → address → phone → email → delivery window. Phone and email
//! self-loop on invalid input; «Отмена» is honored only on the very first
//! step and discards everything collected. The machine is plain state plus
//! a pure `apply`, so it is testable without a Telegram connection.

use crate::core::validation::{validate_email, validate_phone};

/// Cancellation keyword shown on the reply keyboard during checkout
pub const CANCEL_TEXT: &str = "Отмена";

pub const NAME_PROMPT: &str = "Внимание! При оформлении заказа Вы даете согласие на обработку персональных данных.\nПожалуйста, введите Ваше ФИО:";
pub const ADDRESS_PROMPT: &str = "Пожалуйста, введите Ваш адрес доставки:";
pub const PHONE_PROMPT: &str =
    "🎯 Мы почти у цели. 🎯\n📱 Укажите Ваш номер телефона. 📱\nПример номера телефона: +7 xxx xxx xx xx";
pub const PHONE_INVALID: &str = "Номер указан в неправильном формате. Пример номера телефона: +7 xxx xxx xx xx";
pub const EMAIL_PROMPT: &str = "Пожалуйста, введите Ваш email:";
pub const EMAIL_INVALID: &str = "Некорректный формат email. Пожалуйста, введите email еще раз:";
pub const DELIVERY_PROMPT: &str = "Пожалуйста, введите желаемую дату и время доставки:";

/// Which field the flow is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Name,
    Address,
    Phone,
    Email,
    DeliveryWindow,
}

/// Completed form, ready to become an order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub delivery_datetime: String,
}

/// Result of feeding one user message into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Field accepted; show the next question
    Prompt(&'static str),
    /// Input rejected; same stage, re-prompt
    Invalid(&'static str),
    /// All fields collected; run the ledger checkout
    Completed(OrderForm),
    /// User cancelled on the name step; discard the form
    Cancelled,
}

/// In-progress checkout form. Lives in the session store.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    stage: Option<CheckoutStage>,
    name: String,
    address: String,
    phone: String,
    email: String,
}

impl CheckoutForm {
    /// Starts a fresh flow waiting for the user's name.
    pub fn new() -> Self {
        Self {
            stage: Some(CheckoutStage::Name),
            ..Self::default()
        }
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage.unwrap_or(CheckoutStage::Name)
    }

    /// Advances the machine with one message of user input.
    pub fn apply(&mut self, input: &str) -> StepOutcome {
        let input = input.trim();
        match self.stage() {
            CheckoutStage::Name => {
                if input == CANCEL_TEXT {
                    return StepOutcome::Cancelled;
                }
                self.name = input.to_string();
                self.stage = Some(CheckoutStage::Address);
                StepOutcome::Prompt(ADDRESS_PROMPT)
            }
            CheckoutStage::Address => {
                self.address = input.to_string();
                self.stage = Some(CheckoutStage::Phone);
                StepOutcome::Prompt(PHONE_PROMPT)
            }
            CheckoutStage::Phone => match validate_phone(input) {
                Ok(phone) => {
                    self.phone = phone;
                    self.stage = Some(CheckoutStage::Email);
                    StepOutcome::Prompt(EMAIL_PROMPT)
                }
                Err(_) => StepOutcome::Invalid(PHONE_INVALID),
            },
            CheckoutStage::Email => match validate_email(input) {
                Ok(email) => {
                    self.email = email;
                    self.stage = Some(CheckoutStage::DeliveryWindow);
                    StepOutcome::Prompt(DELIVERY_PROMPT)
                }
                Err(_) => StepOutcome::Invalid(EMAIL_INVALID),
            },
            CheckoutStage::DeliveryWindow => StepOutcome::Completed(OrderForm {
                name: std::mem::take(&mut self.name),
                address: std::mem::take(&mut self.address),
                phone: std::mem::take(&mut self.phone),
                email: std::mem::take(&mut self.email),
                delivery_datetime: input.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_full_linear_sequence() {
        let mut form = CheckoutForm::new();
        assert_eq!(form.apply("Иванов Иван"), StepOutcome::Prompt(ADDRESS_PROMPT));
        assert_eq!(form.apply("Москва, Тверская 1"), StepOutcome::Prompt(PHONE_PROMPT));
        assert_eq!(form.apply("+79991234567"), StepOutcome::Prompt(EMAIL_PROMPT));
        assert_eq!(form.apply("ivan@example.com"), StepOutcome::Prompt(DELIVERY_PROMPT));

        match form.apply("завтра после 18:00") {
            StepOutcome::Completed(order) => {
                assert_eq!(order.name, "Иванов Иван");
                assert_eq!(order.address, "Москва, Тверская 1");
                assert_eq!(order.phone, "+79991234567");
                assert_eq!(order.email, "ivan@example.com");
                assert_eq!(order.delivery_datetime, "завтра после 18:00");
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn invalid_phone_self_loops_without_advancing() {
        let mut form = CheckoutForm::new();
        form.apply("Иванов");
        form.apply("Москва");
        assert_eq!(form.apply("12345"), StepOutcome::Invalid(PHONE_INVALID));
        assert_eq!(form.stage(), CheckoutStage::Phone);
        assert_eq!(form.apply("79991234567"), StepOutcome::Prompt(EMAIL_PROMPT));
    }

    #[test]
    fn invalid_email_self_loops_without_advancing() {
        let mut form = CheckoutForm::new();
        form.apply("Иванов");
        form.apply("Москва");
        form.apply("79991234567");
        assert_eq!(form.apply("a.b@@example"), StepOutcome::Invalid(EMAIL_INVALID));
        assert_eq!(form.stage(), CheckoutStage::Email);
    }

    #[test]
    fn cancel_only_works_on_the_name_step() {
        let mut form = CheckoutForm::new();
        assert_eq!(form.apply(CANCEL_TEXT), StepOutcome::Cancelled);

        // Past the first step the keyword is treated as literal input
        let mut form = CheckoutForm::new();
        form.apply("Иванов");
        assert_eq!(form.apply(CANCEL_TEXT), StepOutcome::Prompt(PHONE_PROMPT));
    }
}
