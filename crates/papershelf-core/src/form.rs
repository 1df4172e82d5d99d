//! State of the "add paper" form.

use std::path::Path;

use chrono::NaiveDate;

use crate::sequence::RequestTicket;
use crate::{Author, ExtractedMetadata, PaperInput, ValidationError};

/// Editable fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    File,
    Title,
    Authors,
    Abstract,
    Tags,
    PublicationDate,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        Self::File,
        Self::Title,
        Self::Authors,
        Self::Abstract,
        Self::Tags,
        Self::PublicationDate,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::File => "PDF file *",
            Self::Title => "Title *",
            Self::Authors => "Authors *",
            Self::Abstract => "Abstract",
            Self::Tags => "Tags",
            Self::PublicationDate => "Publication Date",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::File => "path to a local PDF",
            Self::Authors => "Separate multiple authors with commas",
            Self::Tags => "Separate tags with commas",
            Self::PublicationDate => "YYYY-MM-DD",
            Self::Title | Self::Abstract => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddPaperForm {
    pub file_path: String,
    pub title: String,
    pub authors: String,
    pub r#abstract: String,
    pub tags: String,
    pub publication_date: String,
    pub pdf_hash: String,
    /// Set while a metadata extraction is in flight.
    pub extracting: Option<RequestTicket>,
}

impl AddPaperForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::File => &self.file_path,
            FormField::Title => &self.title,
            FormField::Authors => &self.authors,
            FormField::Abstract => &self.r#abstract,
            FormField::Tags => &self.tags,
            FormField::PublicationDate => &self.publication_date,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::File => &mut self.file_path,
            FormField::Title => &mut self.title,
            FormField::Authors => &mut self.authors,
            FormField::Abstract => &mut self.r#abstract,
            FormField::Tags => &mut self.tags,
            FormField::PublicationDate => &mut self.publication_date,
        }
    }

    pub fn is_extracting(&self) -> bool {
        self.extracting.is_some()
    }

    /// File name of the selected PDF, if any.
    pub fn file_name(&self) -> Option<String> {
        let path = self.file_path.trim();
        if path.is_empty() {
            return None;
        }
        Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Whether an extraction may be started now.
    pub fn can_extract(&self) -> bool {
        !self.is_extracting() && self.file_name().is_some()
    }

    /// Fill the form from extracted metadata. Missing values clear the
    /// corresponding field.
    pub fn apply_extraction(&mut self, meta: ExtractedMetadata) {
        self.title = meta.title.unwrap_or_default();
        self.r#abstract = meta.r#abstract.unwrap_or_default();
        self.publication_date = meta.publication_date.unwrap_or_default();
        self.authors = meta
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.tags = meta.keywords.join(", ");
        self.pdf_hash = meta.pdf_hash.unwrap_or_default();
    }

    /// Check required fields and build the request body.
    pub fn to_input(&self) -> Result<PaperInput, ValidationError> {
        let pdf_filename = self.file_name().ok_or(ValidationError::MissingFile)?;
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let authors: Vec<Author> = split_list(&self.authors).map(Author::new).collect();
        if authors.is_empty() {
            return Err(ValidationError::MissingAuthors);
        }
        let date = self.publication_date.trim();
        let publication_date = if date.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| ValidationError::InvalidDate(date.to_string()))?,
            )
        };
        let r#abstract = Some(self.r#abstract.trim().to_string()).filter(|s| !s.is_empty());
        Ok(PaperInput {
            title: title.to_string(),
            r#abstract,
            publication_date,
            pdf_filename,
            pdf_hash: self.pdf_hash.clone(),
            authors,
            keywords: split_list(&self.tags).map(str::to_string).collect(),
        })
    }

    /// Same checks as [`to_input`](Self::to_input), without building the body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_input().map(|_| ())
    }
}

/// Comma separated, trimmed, empty entries dropped.
fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|x| !x.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> AddPaperForm {
        AddPaperForm {
            file_path: "/home/me/papers/attention.pdf".into(),
            title: "  Attention  ".into(),
            authors: "Vaswani, , Shazeer ".into(),
            tags: "nlp,transformers,".into(),
            publication_date: "2017-06-12".into(),
            ..AddPaperForm::default()
        }
    }

    #[test]
    fn input_splits_and_trims_lists() {
        let input = filled().to_input().unwrap();
        assert_eq!(input.title, "Attention");
        assert_eq!(input.pdf_filename, "attention.pdf");
        assert_eq!(
            input.authors,
            vec![Author::new("Vaswani"), Author::new("Shazeer")]
        );
        assert_eq!(input.keywords, vec!["nlp", "transformers"]);
        assert_eq!(input.publication_date, NaiveDate::from_ymd_opt(2017, 6, 12));
        assert_eq!(input.r#abstract, None);
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut f = filled();
        f.file_path.clear();
        assert_eq!(f.validate(), Err(ValidationError::MissingFile));

        let mut f = filled();
        f.title = "   ".into();
        assert_eq!(f.validate(), Err(ValidationError::MissingTitle));

        let mut f = filled();
        f.authors = " , ".into();
        assert_eq!(f.validate(), Err(ValidationError::MissingAuthors));
    }

    #[test]
    fn bad_date_is_rejected_and_empty_date_is_none() {
        let mut f = filled();
        f.publication_date = "12/06/2017".into();
        assert!(matches!(f.validate(), Err(ValidationError::InvalidDate(_))));
        f.publication_date.clear();
        assert_eq!(f.to_input().unwrap().publication_date, None);
    }

    #[test]
    fn extraction_fills_fields_and_keeps_hash() {
        let mut f = AddPaperForm {
            file_path: "a.pdf".into(),
            title: "old".into(),
            ..AddPaperForm::default()
        };
        f.apply_extraction(ExtractedMetadata {
            title: Some("New".into()),
            authors: vec![Author::new("A"), Author::new("B")],
            keywords: vec!["x".into(), "y".into()],
            pdf_hash: Some("abc".into()),
            ..ExtractedMetadata::default()
        });
        assert_eq!(f.title, "New");
        assert_eq!(f.authors, "A, B");
        assert_eq!(f.tags, "x, y");
        assert_eq!(f.pdf_hash, "abc");
        assert_eq!(f.to_input().unwrap().pdf_hash, "abc");
    }

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(FormField::PublicationDate.next(), FormField::File);
        assert_eq!(FormField::File.prev(), FormField::PublicationDate);
    }
}
