//! Message composition
//!
//! Builds the multipart resume email. Composition is pure: the document is
//! handed in by the caller, so fetch cadence is decided by the dispatcher.

use lettre::message::{
    header::{ContentType, Header, HeaderName, HeaderValue},
    Attachment, Mailbox, Message, MultiPart, SinglePart,
};
use tracing::warn;

use crate::error::MailerError;
use crate::types::{Document, RequesterProfile, SenderProfile};

/// MIME type of the attached resume
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Filename used for the attachment part
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachmentName {
    /// `<sender name>_Resume.pdf`
    #[default]
    SenderName,
    Fixed(String),
}

impl AttachmentName {
    pub fn resolve(&self, sender: &SenderProfile) -> String {
        match self {
            AttachmentName::SenderName => format!("{}_Resume.pdf", sender.name),
            AttachmentName::Fixed(name) => name.clone(),
        }
    }
}

/// Header policy for composed messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub attachment_name: AttachmentName,

    /// Set Reply-To to the sender address
    pub reply_to: bool,

    /// Add `X-Priority: 1`
    pub high_priority: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            attachment_name: AttachmentName::SenderName,
            reply_to: true,
            high_priority: true,
        }
    }
}

/// `X-Priority` header; lettre has no built-in type for it
#[derive(Debug, Clone, PartialEq, Eq)]
struct XPriority(String);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// A message ready for delivery
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    pub subject: String,
    pub to: String,
    /// Filename of the attachment, if one was included
    pub attachment: Option<String>,
    message: Message,
}

impl ComposedMessage {
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// RFC 5322 wire form
    pub fn formatted(&self) -> Vec<u8> {
        self.message.formatted()
    }
}

/// Subject line for a sender's resume email
pub fn subject_for(sender: &SenderProfile) -> String {
    format!("{}'s Resume | Software/Cloud Engineering", sender.name)
}

/// Plain-text body addressed to the requester
pub fn body_for(sender: &SenderProfile, requester: &RequesterProfile) -> String {
    format!(
        "Hi {requester_name},\n\
         \n\
         Thank you for taking the time to review my resume. I appreciate your interest \
         and the opportunity to be considered for a potential role.\n\
         \n\
         If there's any additional information or documentation you need, whether that's \
         work samples, references, or clarification on anything in my experience, please \
         don't hesitate to reach out.\n\
         \n\
         Feel free to reference my Github to view some of my projects!\n\
         ({github})\n\
         \n\
         Looking forward to hearing from you.\n\
         \n\
         Best regards,\n\
         {sender_name}\n\
         {phone}\n\
         {linkedin}\n",
        requester_name = requester.name,
        github = sender.github_url,
        sender_name = sender.name,
        phone = sender.phone,
        linkedin = sender.linked_in_url,
    )
}

/// Compose the resume email
pub fn compose(
    sender: &SenderProfile,
    requester: &RequesterProfile,
    document: Option<&Document>,
    options: &ComposeOptions,
) -> Result<ComposedMessage, MailerError> {
    let from: Mailbox = sender
        .email
        .parse()
        .map_err(|e| MailerError::Composition(format!("invalid sender address: {e}")))?;
    let to: Mailbox = requester
        .email
        .parse()
        .map_err(|e| MailerError::Composition(format!("invalid requester address: {e}")))?;

    let subject = subject_for(sender);

    let mut builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject.clone());
    if options.reply_to {
        builder = builder.reply_to(from);
    }
    if options.high_priority {
        builder = builder.header(XPriority("1".to_string()));
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body_for(sender, requester)));

    let attachment = match document {
        Some(doc) => {
            let filename = options.attachment_name.resolve(sender);
            let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
                .map_err(|e| MailerError::Composition(e.to_string()))?;
            parts = parts.singlepart(
                Attachment::new(filename.clone()).body(doc.as_bytes().to_vec(), content_type),
            );
            Some(filename)
        }
        None => {
            warn!(to = %requester.email, "Resume unavailable, sending without attachment");
            None
        }
    };

    let message = builder
        .multipart(parts)
        .map_err(|e| MailerError::Composition(e.to_string()))?;

    Ok(ComposedMessage {
        subject,
        to: requester.email.clone(),
        attachment,
        message,
    })
}
