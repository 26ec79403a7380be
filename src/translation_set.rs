use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::resource::ResourceString;

/// An insertion-ordered collection of resources indexed by hash key.
#[derive(Debug, Clone, Default)]
pub struct TranslationSet {
    source_locale: String,
    resources: Vec<ResourceString>,
    by_hash: HashMap<String, usize>,
    by_clean_hash: HashMap<String, usize>,
    by_source: HashMap<(String, Option<String>), usize>,
    dirty: bool,
}

impl TranslationSet {
    pub fn new(source_locale: &str) -> Self {
        TranslationSet {
            source_locale: source_locale.to_string(),
            ..Default::default()
        }
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    /// Add a resource.
    ///
    /// A resource with a new hash key is appended. A resource whose hash key is
    /// already present replaces the existing one in place when its content
    /// changed, so the last writer wins while the first writer keeps its position.
    ///
    /// # Returns
    /// `true` if the set changed
    pub fn add(&mut self, resource: ResourceString) -> bool {
        let hash = resource.hash_key();
        if let Some(&idx) = self.by_hash.get(&hash) {
            if self.resources[idx] == resource {
                return false;
            }
            debug!(
                "Updating resource {}: '{}' -> '{}'",
                hash, self.resources[idx].source, resource.source
            );
            let old_source = (
                self.resources[idx].source.clone(),
                self.resources[idx].context.clone(),
            );
            if self.by_source.get(&old_source) == Some(&idx) {
                self.by_source.remove(&old_source);
            }
            self.by_source
                .insert((resource.source.clone(), resource.context.clone()), idx);
            self.resources[idx] = resource;
            self.dirty = true;
            return true;
        }

        let idx = self.resources.len();
        self.by_clean_hash.insert(resource.clean_hash_key(), idx);
        self.by_source
            .entry((resource.source.clone(), resource.context.clone()))
            .or_insert(idx);
        self.by_hash.insert(hash, idx);
        self.resources.push(resource);
        self.dirty = true;
        true
    }

    pub fn add_all<I>(&mut self, resources: I)
    where
        I: IntoIterator<Item = ResourceString>,
    {
        for resource in resources {
            self.add(resource);
        }
    }

    pub fn add_set(&mut self, other: &TranslationSet) {
        self.add_all(other.resources.iter().cloned());
    }

    /// Look up a resource by its exact hash key.
    pub fn get(&self, hash_key: &str) -> Option<&ResourceString> {
        self.by_hash.get(hash_key).map(|&idx| &self.resources[idx])
    }

    /// Look up a resource by its cleaned hash key.
    pub fn get_clean(&self, clean_hash_key: &str) -> Option<&ResourceString> {
        self.by_clean_hash
            .get(clean_hash_key)
            .map(|&idx| &self.resources[idx])
    }

    pub fn get_by_source(&self, source: &str, context: Option<&str>) -> Option<&ResourceString> {
        self.by_source
            .get(&(source.to_string(), context.map(str::to_string)))
            .map(|&idx| &self.resources[idx])
    }

    /// Remove the resource with the given hash key.
    pub fn remove(&mut self, hash_key: &str) -> Option<ResourceString> {
        let idx = self.by_hash.get(hash_key).copied()?;
        let removed = self.resources.remove(idx);
        self.reindex();
        self.dirty = true;
        Some(removed)
    }

    fn reindex(&mut self) {
        self.by_hash.clear();
        self.by_clean_hash.clear();
        self.by_source.clear();
        for (idx, resource) in self.resources.iter().enumerate() {
            self.by_hash.insert(resource.hash_key(), idx);
            self.by_clean_hash.insert(resource.clean_hash_key(), idx);
            self.by_source
                .entry((resource.source.clone(), resource.context.clone()))
                .or_insert(idx);
        }
    }

    pub fn get_all(&self) -> &[ResourceString] {
        &self.resources
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceString> {
        self.resources.iter()
    }

    pub fn size(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_clean(&mut self) {
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.resources.clear();
        self.by_hash.clear();
        self.by_clean_hash.clear();
        self.by_source.clear();
        self.dirty = false;
    }

    /// Resources of `other` that are missing from this set or differ from the
    /// copy held here.
    pub fn diff(&self, other: &TranslationSet) -> TranslationSet {
        let mut diff = TranslationSet::new(&self.source_locale);
        for resource in other.iter() {
            match self.get(&resource.hash_key()) {
                Some(existing) if existing == resource => {}
                _ => {
                    diff.add(resource.clone());
                }
            }
        }
        diff
    }
}

/// A translation set that can be shared between threads localizing different files.
#[derive(Debug, Clone, Default)]
pub struct SharedTranslationSet(Arc<RwLock<TranslationSet>>);

impl SharedTranslationSet {
    pub fn new(source_locale: &str) -> Self {
        SharedTranslationSet(Arc::new(RwLock::new(TranslationSet::new(source_locale))))
    }

    pub fn add(&self, resource: ResourceString) -> bool {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(resource)
    }

    pub fn add_set(&self, other: &TranslationSet) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_set(other);
    }

    pub fn size(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).size()
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> TranslationSet {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(key: &str, source: &str) -> ResourceString {
        ResourceString::new("foo", "en-US", key, source).with_datatype("html")
    }

    #[test]
    fn test_add_and_get() {
        let mut set = TranslationSet::new("en-US");
        assert!(set.add(resource("r654479252", "This is a test")));
        assert_eq!(set.size(), 1);
        assert!(set.is_dirty());

        let found = set.get("rs_foo_en-US_r654479252_html").unwrap();
        assert_eq!(found.source, "This is a test");
        assert!(set.get("rs_foo_fr-FR_r654479252_html").is_none());
    }

    #[test]
    fn test_add_same_resource_twice_is_noop() {
        let mut set = TranslationSet::new("en-US");
        set.add(resource("r1", "One"));
        set.set_clean();
        assert!(!set.add(resource("r1", "One")));
        assert_eq!(set.size(), 1);
        assert!(!set.is_dirty());
    }

    #[test]
    fn test_last_writer_wins_and_keeps_position() {
        let mut set = TranslationSet::new("en-US");
        set.add(resource("r1", "One"));
        set.add(resource("r2", "Two"));
        assert!(set.add(resource("r1", "Uno")));

        assert_eq!(set.size(), 2);
        assert_eq!(set.get_all()[0].source, "Uno");
        assert!(set.get_by_source("One", None).is_none());
        assert_eq!(set.get_by_source("Uno", None).unwrap().key, "r1");
    }

    #[test]
    fn test_get_clean() {
        let mut set = TranslationSet::new("en-US");
        set.add(
            ResourceString::new("foo", "en-US", "r654479252", "This is a test")
                .with_target("fr-FR", "Ceci est un essai")
                .with_datatype("html"),
        );
        let key = ResourceString::clean_hash_key_for("foo", "fr-FR", "r654479252", "html");
        assert_eq!(set.get_clean(&key).unwrap().target.as_deref(), Some("Ceci est un essai"));
    }

    #[test]
    fn test_get_by_source_with_context() {
        let mut set = TranslationSet::new("en-US");
        set.add(resource("r1", "Open").with_context("menu"));
        set.add(resource("r2", "Open"));
        assert_eq!(set.get_by_source("Open", Some("menu")).unwrap().key, "r1");
        assert_eq!(set.get_by_source("Open", None).unwrap().key, "r2");
    }

    #[test]
    fn test_remove_reindexes() {
        let mut set = TranslationSet::new("en-US");
        set.add(resource("r1", "One"));
        set.add(resource("r2", "Two"));
        let removed = set.remove("rs_foo_en-US_r1_html").unwrap();
        assert_eq!(removed.source, "One");
        assert_eq!(set.size(), 1);
        assert_eq!(set.get("rs_foo_en-US_r2_html").unwrap().source, "Two");
        assert!(set.remove("rs_foo_en-US_r1_html").is_none());
    }

    #[test]
    fn test_diff() {
        let mut ours = TranslationSet::new("en-US");
        ours.add(resource("r1", "One"));
        ours.add(resource("r2", "Two"));

        let mut theirs = TranslationSet::new("en-US");
        theirs.add(resource("r1", "One"));
        theirs.add(resource("r2", "Deux"));
        theirs.add(resource("r3", "Three"));

        let diff = ours.diff(&theirs);
        let keys: Vec<&str> = diff.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["r2", "r3"]);
    }

    #[test]
    fn test_shared_set_across_threads() {
        let shared = SharedTranslationSet::new("en-US");
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared.add(resource(&format!("r{}", i), &format!("String {}", i)));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.size(), 4);
        assert_eq!(shared.snapshot().size(), 4);
    }
}
