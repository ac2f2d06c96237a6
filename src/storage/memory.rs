use super::{error::Result, CourseStore};
use crate::core::{Course, CourseId};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-memory course store using DashMap for concurrent access.
///
/// Records live in a DashMap, a sharded concurrent HashMap, so reads and
/// writes from different tasks never contend on a single lock. Store
/// iteration order (insertion order) is tracked separately, since DashMap
/// iteration order is unspecified.
///
/// Suitable for tests and development; nothing survives the process.
pub struct InMemoryCourseStore {
    /// Concurrent storage for course records keyed by id
    records: dashmap::DashMap<CourseId, Course>,
    /// Insertion order, the store's iteration order
    insertion_order: Mutex<Vec<CourseId>>,
}

impl InMemoryCourseStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: dashmap::DashMap::new(),
            insertion_order: Mutex::new(Vec::new()),
        }
    }

    /// Removes every record.
    pub async fn clear(&self) {
        self.records.clear();
        self.insertion_order.lock().await.clear();
    }
}

impl Default for InMemoryCourseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<Course>> {
        let order = self.insertion_order.lock().await;
        Ok(order
            .iter()
            .filter_map(|id| self.records.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn save(&self, course: Course) -> Result<Course> {
        let id = course.id();
        if self.records.insert(id, course.clone()).is_none() {
            self.insertion_order.lock().await.push(id);
        }
        Ok(course)
    }

    async fn exists_by_id(&self, id: CourseId) -> Result<bool> {
        Ok(self.records.contains_key(&id))
    }

    async fn find_requiring(&self, prerequisite_id: CourseId) -> Result<Vec<Course>> {
        let all = self.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|c| c.has_prerequisite(&prerequisite_id))
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>> {
        let all = self.find_all().await?;
        Ok(all.into_iter().find(|c| c.name().eq_ignore_ascii_case(name)))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        let all = self.find_all().await?;
        Ok(all.into_iter().find(|c| c.code().eq_ignore_ascii_case(code)))
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<bool> {
        let removed = self.records.remove(&id).is_some();
        if removed {
            self.insertion_order.lock().await.retain(|x| *x != id);
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CourseDraft;

    fn course(code: &str, name: &str) -> Course {
        Course::new(CourseDraft::new(code, name))
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryCourseStore::new();
        let c = course("MATH101", "Calculus I");
        let id = c.id();

        store.save(c).await.unwrap();

        assert!(store.exists_by_id(id).await.unwrap());
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.code(), "MATH101");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = InMemoryCourseStore::new();
        assert!(store.find_by_id(CourseId::new()).await.unwrap().is_none());
        assert!(!store.exists_by_id(CourseId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_preserves_insertion_order() {
        let store = InMemoryCourseStore::new();
        let codes = ["CS101", "CS201", "CS301"];
        for code in codes {
            store.save(course(code, code)).await.unwrap();
        }

        let all = store.find_all().await.unwrap();
        let listed: Vec<&str> = all.iter().map(|c| c.code()).collect();
        assert_eq!(listed, codes);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = InMemoryCourseStore::new();
        let mut c = course("CS101", "Intro");
        let id = c.id();
        store.save(c.clone()).await.unwrap();

        c.apply_metadata(&CourseDraft::new("CS101", "Intro to Computing"));
        store.save(c).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.name(), "Intro to Computing");
    }

    #[tokio::test]
    async fn test_find_requiring() {
        let store = InMemoryCourseStore::new();
        let base = course("MATH101", "Calculus I");
        let base_id = base.id();
        store.save(base).await.unwrap();

        let mut next = course("MATH201", "Calculus II");
        next.add_prerequisite(base_id);
        store.save(next).await.unwrap();

        let unrelated = course("ART100", "Drawing");
        store.save(unrelated).await.unwrap();

        let requiring = store.find_requiring(base_id).await.unwrap();
        assert_eq!(requiring.len(), 1);
        assert_eq!(requiring[0].code(), "MATH201");
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive() {
        let store = InMemoryCourseStore::new();
        store.save(course("CS101", "Intro to Computing")).await.unwrap();

        let found = store.find_by_name("intro TO computing").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_name("no such course").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_code_is_case_insensitive() {
        let store = InMemoryCourseStore::new();
        store.save(course("CS101", "Intro")).await.unwrap();

        assert!(store.find_by_code("cs101").await.unwrap().is_some());
        assert!(store.find_by_code("CS999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryCourseStore::new();
        store.save(course("CS101", "Intro")).await.unwrap();
        store.clear().await;
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryCourseStore::new();
        let c = course("CS101", "Intro");
        let id = c.id();
        store.save(c).await.unwrap();

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(!store.delete_by_id(id).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
