use minijinja::{context, Environment};

use super::mailer::{EmailAttachment, OutgoingEmail};
use crate::core::Money;
use crate::models::{Client, Invoice};
use crate::pdf::RenderedDocument;

const SUBJECT_TEMPLATE: &str = "Invoice #{{ invoice.id }}";

const BODY_TEMPLATE: &str = "Dear {{ client.name }},

Please find attached your invoice #{{ invoice.id }}.

Amount: {{ invoice.amount|money }}
Tax: {{ invoice.tax|money }}
Total: {{ invoice.total|money }}

Regards,
{{ signature }}
";

fn money_filter(value: f64) -> String {
    Money::new(value).format()
}

/// Builds invoice emails from fixed subject and body templates.
pub struct EmailComposer {
    env: Environment<'static>,
    sender: String,
    signature: String,
}

impl EmailComposer {
    pub fn new(sender: impl Into<String>, signature: impl Into<String>) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("money", money_filter);
        env.add_template("subject.txt", SUBJECT_TEMPLATE)?;
        env.add_template("body.txt", BODY_TEMPLATE)?;

        Ok(EmailComposer {
            env,
            sender: sender.into(),
            signature: signature.into(),
        })
    }

    pub fn compose(
        &self,
        invoice: &Invoice,
        client: &Client,
        document: &RenderedDocument,
    ) -> Result<OutgoingEmail, minijinja::Error> {
        let ctx = context! {
            invoice => invoice,
            client => client,
            signature => &self.signature,
        };

        let subject = self.env.get_template("subject.txt")?.render(&ctx)?;
        let body = self.env.get_template("body.txt")?.render(&ctx)?;

        Ok(OutgoingEmail {
            from: self.sender.clone(),
            to: client.email.clone(),
            subject,
            body,
            attachment: Some(EmailAttachment {
                filename: document.file_name(),
                content_type: "application/pdf".to_string(),
                bytes: document.bytes.clone(),
            }),
        })
    }
}
