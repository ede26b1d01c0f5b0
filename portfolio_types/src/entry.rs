use portfolio_time::Time;
use serde::{Deserialize, Serialize};

use crate::{Category, Difficulty, EntryId, ImageRef, ValidationError};

/// One showcased project, as stored in the catalog collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: EntryId,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub detailed_description: String,
    pub category: Category,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub created_at: Time,
    pub updated_at: Time,
}

impl CatalogEntry {
    /// Materialize the entry a store holds after persisting `doc` under `id`
    pub fn from_document(id: EntryId, doc: EntryDocument) -> Self {
        let EntryDocument {
            draft,
            created_at,
            updated_at,
        } = doc;
        Self {
            id,
            name: draft.name,
            short_description: draft.short_description,
            detailed_description: draft.detailed_description,
            category: draft.category,
            tech_stack: draft.tech_stack,
            features: draft.features,
            images: draft.images,
            youtube_video: draft.youtube_video,
            timeline: draft.timeline,
            difficulty: draft.difficulty,
            created_at,
            updated_at,
        }
    }

    /// Merge the fields set on `patch` into this entry, leaving the rest untouched
    pub fn apply_patch(&mut self, patch: &EntryPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(short) = &patch.short_description {
            self.short_description.clone_from(short);
        }
        if let Some(detailed) = &patch.detailed_description {
            self.detailed_description.clone_from(detailed);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tech_stack) = &patch.tech_stack {
            self.tech_stack.clone_from(tech_stack);
        }
        if let Some(features) = &patch.features {
            self.features.clone_from(features);
        }
        if let Some(images) = &patch.images {
            self.images.clone_from(images);
        }
        if let Some(youtube_video) = &patch.youtube_video {
            self.youtube_video.clone_from(youtube_video);
        }
        if let Some(timeline) = &patch.timeline {
            self.timeline.clone_from(timeline);
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }

    /// Case-insensitive match of `term` against the name, short description and tech stack
    ///
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.short_description.to_lowercase().contains(&term)
            || self
                .tech_stack
                .iter()
                .any(|tech| tech.to_lowercase().contains(&term))
    }
}

/// The editable fields of a catalog entry, before the store has assigned an id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub category: Category,
    pub tech_stack: Vec<String>,
    pub features: Vec<String>,
    pub images: Vec<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    pub difficulty: Difficulty,
}

impl EntryDraft {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            ..Default::default()
        }
    }

    /// Normalize the draft and check the fields an admin must fill in
    ///
    /// Text is trimmed, blank tags and features are dropped along with repeats, and blank
    /// optional fields become `None`.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required("name", self.name)?;
        self.short_description = required("shortDescription", self.short_description)?;
        self.detailed_description = required("detailedDescription", self.detailed_description)?;
        self.tech_stack = distinct_non_blank(self.tech_stack);
        self.features = distinct_non_blank(self.features);
        self.youtube_video = non_blank(self.youtube_video);
        self.timeline = non_blank(self.timeline);
        Ok(self)
    }
}

/// A draft stamped with its timestamps, ready to be written as a new document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument {
    #[serde(flatten)]
    pub draft: EntryDraft,
    pub created_at: Time,
    pub updated_at: Time,
}

impl EntryDocument {
    pub fn new(draft: EntryDraft, now: Time) -> Self {
        Self {
            draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update; only the fields that are `Some` are written
///
/// The optional text fields are doubly wrapped so that `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_video: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

impl EntryPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn images(mut self, images: impl IntoIterator<Item = ImageRef>) -> Self {
        self.images = Some(images.into_iter().collect());
        self
    }

    pub fn with_updated_at(mut self, now: Time) -> Self {
        self.updated_at = Some(now);
        self
    }

    /// `true` if no editable field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.short_description.is_none()
            && self.detailed_description.is_none()
            && self.category.is_none()
            && self.tech_stack.is_none()
            && self.features.is_none()
            && self.images.is_none()
            && self.youtube_video.is_none()
            && self.timeline.is_none()
            && self.difficulty.is_none()
    }

    /// Apply the same normalization as [`EntryDraft::validate`] to whichever fields are set
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.map(|v| required("name", v)).transpose()?;
        self.short_description = self
            .short_description
            .map(|v| required("shortDescription", v))
            .transpose()?;
        self.detailed_description = self
            .detailed_description
            .map(|v| required("detailedDescription", v))
            .transpose()?;
        self.tech_stack = self.tech_stack.map(distinct_non_blank);
        self.features = self.features.map(distinct_non_blank);
        self.youtube_video = self.youtube_video.map(non_blank);
        self.timeline = self.timeline.map(non_blank);
        Ok(self)
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn distinct_non_blank(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim();
        if !v.is_empty() && !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}
