//! Diff result tree: per-kind diff sets, per-type diffs, and the assembly
//! level summary.

use super::list_differ::{diff, diff_set};
use crate::equality::{event_equal, field_equal, method_equal, type_equal, type_reference_equal};
use crate::model::{EventRecord, FieldRecord, MethodRecord, TypeKind, TypeRecord, TypeReference};
use crate::query::QueryAggregator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOperation {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry<T> {
    pub operation: DiffOperation,
    pub item: T,
}

/// Symmetric difference of one kind of record. Removed entries come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct DiffSet<T> {
    entries: Vec<DiffEntry<T>>,
}

impl<T> Default for DiffSet<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> DiffSet<T> {
    pub fn from_parts(removed: Vec<DiffEntry<T>>, added: Vec<DiffEntry<T>>) -> Self {
        let mut entries = removed;
        entries.extend(added);
        Self { entries }
    }

    pub fn entries(&self) -> &[DiffEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn added(&self) -> impl Iterator<Item = &T> {
        self.with_operation(DiffOperation::Added)
    }

    pub fn removed(&self) -> impl Iterator<Item = &T> {
        self.with_operation(DiffOperation::Removed)
    }

    pub fn added_count(&self) -> usize {
        self.added().count()
    }

    pub fn removed_count(&self) -> usize {
        self.removed().count()
    }

    fn with_operation(&self, operation: DiffOperation) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(move |e| e.operation == operation)
            .map(|e| &e.item)
    }
}

/// Member level changes of a type present in both versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDiff {
    pub old_type: TypeRecord,
    pub new_type: TypeRecord,
    pub methods: DiffSet<MethodRecord>,
    pub fields: DiffSet<FieldRecord>,
    pub events: DiffSet<EventRecord>,
    pub interfaces: DiffSet<TypeReference>,
    pub base_type_changed: bool,
}

impl TypeDiff {
    pub fn has_changes(&self) -> bool {
        self.base_type_changed
            || !self.methods.is_empty()
            || !self.fields.is_empty()
            || !self.events.is_empty()
            || !self.interfaces.is_empty()
    }

    /// Diffs the selected members of two versions of one type. Returns
    /// `None` when nothing changed.
    pub fn generate(
        old_type: &TypeRecord,
        new_type: &TypeRecord,
        queries: &QueryAggregator,
    ) -> Option<TypeDiff> {
        let base_type_changed = old_type.kind != TypeKind::Interface
            && match (&old_type.base_type, &new_type.base_type) {
                (None, None) => false,
                (Some(old), Some(new)) => old.full_name() != new.full_name(),
                _ => true,
            };

        let mut removed_interfaces = Vec::new();
        let mut added_interfaces = Vec::new();
        diff(
            &old_type.interfaces,
            &new_type.interfaces,
            |a, b| type_reference_equal(a, b, true),
            |added| {
                added_interfaces.push(DiffEntry {
                    operation: DiffOperation::Added,
                    item: added.clone(),
                })
            },
            |removed| {
                removed_interfaces.push(DiffEntry {
                    operation: DiffOperation::Removed,
                    item: removed.clone(),
                })
            },
        );

        let type_diff = TypeDiff {
            old_type: old_type.clone(),
            new_type: new_type.clone(),
            methods: diff_set(
                &queries.execute_methods(old_type),
                &queries.execute_methods(new_type),
                |a, b| method_equal(a, b, true),
            ),
            fields: diff_set(
                &queries.execute_fields(old_type),
                &queries.execute_fields(new_type),
                field_equal,
            ),
            events: diff_set(
                &queries.execute_events(old_type),
                &queries.execute_events(new_type),
                event_equal,
            ),
            interfaces: DiffSet::from_parts(removed_interfaces, added_interfaces),
            base_type_changed,
        };
        type_diff.has_changes().then_some(type_diff)
    }
}

/// Result of comparing two module snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyDiff {
    added_removed_types: DiffSet<TypeRecord>,
    changed_types: Vec<TypeDiff>,
}

impl AssemblyDiff {
    pub fn new(added_removed_types: DiffSet<TypeRecord>, changed_types: Vec<TypeDiff>) -> Self {
        Self {
            added_removed_types,
            changed_types: changed_types
                .into_iter()
                .filter(TypeDiff::has_changes)
                .collect(),
        }
    }

    /// Types present on only one side. Their members are not diffed.
    pub fn added_removed_types(&self) -> &DiffSet<TypeRecord> {
        &self.added_removed_types
    }

    pub fn changed_types(&self) -> &[TypeDiff] {
        &self.changed_types
    }

    pub fn is_empty(&self) -> bool {
        self.added_removed_types.is_empty() && self.changed_types.is_empty()
    }

    /// Looks up the changes recorded for a type present in both versions.
    pub fn find_changed_type(&self, record: &TypeRecord) -> Option<&TypeDiff> {
        self.changed_types
            .iter()
            .find(|d| type_equal(&d.old_type, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModuleSnapshot;

    fn linked(record: TypeRecord) -> TypeRecord {
        ModuleSnapshot::new("Acme", vec![record]).types.remove(0)
    }

    fn void() -> TypeReference {
        TypeReference::new("System", "Void")
    }

    #[test]
    fn test_unchanged_type_yields_none() {
        let record = TypeRecord::class("Acme", "Widget")
            .with_method(MethodRecord::new("Draw", void()));
        let record = linked(record);
        let queries = QueryAggregator::public_and_protected();
        assert!(TypeDiff::generate(&record, &record.clone(), &queries).is_none());
    }

    #[test]
    fn test_member_changes_are_collected() {
        let old = linked(
            TypeRecord::class("Acme", "Widget")
                .with_method(MethodRecord::new("Draw", void()))
                .with_field(FieldRecord::new("Size", TypeReference::new("System", "Int32"))),
        );
        let new = linked(
            TypeRecord::class("Acme", "Widget")
                .with_method(MethodRecord::new("Render", void()))
                .with_field(FieldRecord::new("Size", TypeReference::new("System", "Int32"))),
        );
        let queries = QueryAggregator::public_and_protected();
        let type_diff = TypeDiff::generate(&old, &new, &queries).unwrap();
        let removed: Vec<&str> = type_diff.methods.removed().map(|m| m.name.as_str()).collect();
        let added: Vec<&str> = type_diff.methods.added().map(|m| m.name.as_str()).collect();
        assert_eq!(removed, vec!["Draw"]);
        assert_eq!(added, vec!["Render"]);
        assert_eq!(type_diff.methods.entries()[0].operation, DiffOperation::Removed);
        assert!(type_diff.fields.is_empty());
        assert!(!type_diff.base_type_changed);
    }

    #[test]
    fn test_base_type_change() {
        let old = linked(TypeRecord::class("Acme", "Widget"));
        let control = TypeReference::new("Acme", "Control");
        let new = linked(TypeRecord::class("Acme", "Widget").with_base_type(control));
        let queries = QueryAggregator::public_and_protected();
        let type_diff = TypeDiff::generate(&old, &new, &queries).unwrap();
        assert!(type_diff.base_type_changed);
        assert!(type_diff.methods.is_empty());
    }

    #[test]
    fn test_interface_base_type_is_ignored_but_interfaces_are_diffed() {
        let disposable = TypeReference::new("System", "IDisposable");
        let old = linked(TypeRecord::interface("Acme", "IWidget"));
        let mut new = linked(TypeRecord::interface("Acme", "IWidget").with_interface(disposable));
        new.base_type = Some(TypeReference::new("System", "Object"));
        let queries = QueryAggregator::public_and_protected();
        let type_diff = TypeDiff::generate(&old, &new, &queries).unwrap();
        assert!(!type_diff.base_type_changed);
        assert_eq!(type_diff.interfaces.added_count(), 1);
        assert_eq!(type_diff.interfaces.removed_count(), 0);
    }

    #[test]
    fn test_assembly_diff_drops_empty_type_diffs() {
        let record = linked(TypeRecord::class("Acme", "Widget"));
        let empty = TypeDiff {
            old_type: record.clone(),
            new_type: record,
            methods: DiffSet::default(),
            fields: DiffSet::default(),
            events: DiffSet::default(),
            interfaces: DiffSet::default(),
            base_type_changed: false,
        };
        let assembly = AssemblyDiff::new(DiffSet::default(), vec![empty]);
        assert!(assembly.is_empty());
    }
}
