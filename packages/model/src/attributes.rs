//! Node attribute bag.
//!
//! A handful of keys carry meaning for the editor and are typed; everything
//! else is kept verbatim in [`Attributes::extra`] and passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Explicit list flavour of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListType {
    #[serde(rename = "ul", alias = "unordered", alias = "bullet")]
    Unordered,
    #[serde(rename = "ol", alias = "ordered", alias = "numbered")]
    Ordered,
}

impl ListType {
    pub fn tag(&self) -> &'static str {
        match self {
            ListType::Unordered => "ul",
            ListType::Ordered => "ol",
        }
    }
}

/// Layout of a container that is not a plain vertical stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Table,
    TableRow,
    Flex,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Unreserved keys, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Attributes::default()
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_list_type(mut self, list_type: ListType) -> Self {
        self.list_type = Some(list_type);
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Shallow merge: every key present in `patch` overwrites ours.
    ///
    /// A `null` in the residual map removes the key.
    pub fn merge(&mut self, patch: &Attributes) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(value) = src {
                *dst = Some(value.clone());
            }
        }

        take(&mut self.class_name, &patch.class_name);
        take(&mut self.background_color, &patch.background_color);
        take(&mut self.list_type, &patch.list_type);
        take(&mut self.placeholder, &patch.placeholder);
        take(&mut self.src, &patch.src);
        take(&mut self.alt, &patch.alt);
        take(&mut self.loading, &patch.loading);
        take(&mut self.error, &patch.error);
        take(&mut self.layout, &patch.layout);

        for (key, value) in &patch.extra {
            if value.is_null() {
                self.extra.remove(key);
            } else {
                self.extra.insert(key.clone(), value.clone());
            }
        }
    }

    /// Result of merging `patch` into a copy of `self`.
    pub fn merged(&self, patch: &Attributes) -> Attributes {
        let mut out = self.clone();
        out.merge(patch);
        out
    }

    pub fn is_loading(&self) -> bool {
        self.loading.unwrap_or(false)
    }

    pub fn has_error(&self) -> bool {
        self.error.unwrap_or(false)
    }
}
