pub mod composer;
pub mod mailer;
pub mod notifier;

pub use composer::EmailComposer;
pub use mailer::{EmailAttachment, MailError, Mailer, OutgoingEmail, SmtpMailer, SmtpSettings};
pub use notifier::{InvoiceNotifier, NotifyError};
