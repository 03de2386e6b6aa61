use indexmap::IndexMap;
use phpscope_api::ClassName;
use std::borrow::Cow;
use std::sync::Arc;

/// Anything stored in a [`ReflectionCollection`] knows its own key.
pub trait CollectionItem {
    /// Method and class names match regardless of case.
    const CASE_INSENSITIVE: bool = false;

    fn key(&self) -> &str;
}

fn normalize<T: CollectionItem + ?Sized>(name: &str) -> Cow<'_, str> {
    if T::CASE_INSENSITIVE {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Members that remember where they were looked up and where they were
/// declared.
pub trait ClassMember {
    /// The class the lookup went through.
    fn class(&self) -> &ClassName;
    /// The class whose declaration fixes the member's type.
    fn declaring_class(&self) -> &ClassName;
}

/// Insertion-ordered, name-keyed members of a class view.
#[derive(Debug, Clone)]
pub struct ReflectionCollection<T> {
    items: IndexMap<String, T>,
}

impl<T> Default for ReflectionCollection<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: CollectionItem> ReflectionCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.insert(item);
        }
        collection
    }

    /// Add or replace in place; a replaced key keeps its position.
    pub fn insert(&mut self, item: T) {
        let key = normalize::<T>(item.key()).into_owned();
        self.items.insert(key, item);
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(normalize::<T>(name).as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.items.contains_key(normalize::<T>(name).as_ref())
    }

    /// Names as declared by the item currently stored under each key.
    pub fn keys(&self) -> Vec<&str> {
        self.items.values().map(T::key).collect()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first().map(|(_, item)| item)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}

impl<T: CollectionItem + ClassMember + Clone> ReflectionCollection<T> {
    /// Only the members declared by `class` itself.
    pub fn belonging_to(&self, class: &ClassName) -> Self {
        Self::from_items(
            self.iter()
                .filter(|item| item.declaring_class().matches(class))
                .cloned(),
        )
    }
}

impl<T> IntoIterator for ReflectionCollection<T> {
    type Item = T;
    type IntoIter = indexmap::map::IntoValues<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

impl<T: CollectionItem> FromIterator<T> for ReflectionCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl<T: CollectionItem + ?Sized> CollectionItem for Arc<T> {
    const CASE_INSENSITIVE: bool = T::CASE_INSENSITIVE;

    fn key(&self) -> &str {
        (**self).key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        declared_by: ClassName,
        tag: u8,
    }

    impl CollectionItem for Item {
        fn key(&self) -> &str {
            self.name
        }
    }

    impl ClassMember for Item {
        fn class(&self) -> &ClassName {
            &self.declared_by
        }

        fn declaring_class(&self) -> &ClassName {
            &self.declared_by
        }
    }

    fn item(name: &'static str, class: &str, tag: u8) -> Item {
        Item {
            name,
            declared_by: ClassName::new(class),
            tag,
        }
    }

    #[test]
    fn test_replacement_keeps_position() {
        let mut collection = ReflectionCollection::new();
        collection.insert(item("one", "A", 1));
        collection.insert(item("two", "A", 1));
        collection.insert(item("one", "B", 2));

        assert_eq!(collection.keys(), vec!["one", "two"]);
        assert_eq!(collection.get("one").unwrap().tag, 2);
        assert_eq!(collection.first().unwrap().name, "one");
        assert_eq!(collection.last().unwrap().name, "two");
    }

    #[derive(Debug, Clone)]
    struct Method(&'static str);

    impl CollectionItem for Method {
        const CASE_INSENSITIVE: bool = true;

        fn key(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_case_insensitive_items_share_a_key() {
        let mut collection = ReflectionCollection::new();
        collection.insert(Method("foo"));
        collection.insert(Method("bar"));
        collection.insert(Method("FOO"));

        assert_eq!(collection.keys(), vec!["FOO", "bar"]);
        assert_eq!(collection.get("Foo").unwrap().0, "FOO");
        assert!(collection.has("BAR"));
    }

    #[test]
    fn test_case_sensitive_items_keep_distinct_keys() {
        let collection =
            ReflectionCollection::from_items([item("name", "A", 1), item("NAME", "A", 2)]);
        assert_eq!(collection.keys(), vec!["name", "NAME"]);
        assert!(collection.get("Name").is_none());
    }

    #[test]
    fn test_belonging_to_filters_by_declaring_class() {
        let collection =
            ReflectionCollection::from_items([item("one", "Parent", 0), item("two", "Child", 0)]);
        let own = collection.belonging_to(&ClassName::new("child"));
        assert_eq!(own.keys(), vec!["two"]);
        assert!(!own.has("one"));
    }
}
