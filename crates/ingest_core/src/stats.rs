use std::collections::BTreeMap;

use serde::Deserialize;

/// The subset of the shared knowledge-base document needed for counting.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseSnapshot {
    pub symptoms: Collection,
    pub conditions: Collection,
    pub diseases: Option<BTreeMap<String, RegionalDisease>>,
}

/// Top-level collections are keyed objects in the PDF-built document and plain
/// lists in the text-built one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Collection {
    Map(serde_json::Map<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

impl Default for Collection {
    fn default() -> Self {
        Collection::List(Vec::new())
    }
}

impl Collection {
    pub fn len(&self) -> usize {
        match self {
            Collection::Map(map) => map.len(),
            Collection::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RegionalDisease {
    pub symptoms: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KnowledgeBaseStats {
    pub symptoms: usize,
    /// General conditions plus region-scoped diseases.
    pub conditions: usize,
    pub regional_diseases: Option<usize>,
    /// Sum of symptom entries across all region-scoped diseases.
    pub regional_symptom_links: Option<usize>,
}

impl KnowledgeBaseStats {
    pub fn from_snapshot(snapshot: &KnowledgeBaseSnapshot) -> Self {
        let regional_diseases = snapshot.diseases.as_ref().map(BTreeMap::len);
        let regional_symptom_links = snapshot
            .diseases
            .as_ref()
            .map(|diseases| diseases.values().map(|d| d.symptoms.len()).sum());
        Self {
            symptoms: snapshot.symptoms.len(),
            conditions: snapshot.conditions.len() + regional_diseases.unwrap_or(0),
            regional_diseases,
            regional_symptom_links,
        }
    }
}
