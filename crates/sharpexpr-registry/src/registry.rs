//! TypeRegistry - the type universe expressions are bound against.
//!
//! Types are stored by [`TypeHash`]. Everything the binder would otherwise ask a
//! reflective runtime (base chains, assignability, member enumeration, whether a
//! member is static) is answered from the explicit entries held here.
//!
//! # Storage Model
//!
//! - One map from hash to [`TypeEntry`]; members and methods live on their
//!   declaring entry behind `Arc`s so lookups hand out cheap clones.
//! - Array types share the `System.Array` entry and nullable types share the
//!   `System.Nullable` entry; their shape lives in [`DataType`].
//!
//! # Thread Safety
//!
//! Populate the registry first, then share it read-only (typically behind an
//! `Arc`). There is no interior mutability.
//!
//! # Example
//!
//! ```
//! use sharpexpr_registry::TypeRegistry;
//! use sharpexpr_core::{DataType, primitives};
//!
//! let registry = TypeRegistry::with_primitives();
//! assert!(registry.get(primitives::INT32).is_some());
//! assert!(registry.is_assignable_from(&DataType::object(), &DataType::string()));
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use sharpexpr_core::{
    DataType, MemberEntry, MethodEntry, PrimitiveKind, RegistrationError, TypeEntry, TypeHash,
    primitives,
};

/// Guards base-chain walks against cyclic registrations.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Registry of every type visible to expressions.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding bare entries for the types the language itself
    /// depends on: `object`, `void`, `string`, the scalars, `Array` and
    /// `Nullable`.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_all_primitives();
        registry
    }

    pub fn register_all_primitives(&mut self) {
        let object = TypeEntry::class("System", "Object").without_base();
        let void = TypeEntry::value_type("System", "Void");
        let string = TypeEntry::class("System", "String");
        let array = TypeEntry::class("System", "Array");
        let nullable = TypeEntry::value_type("System", "Nullable");
        for entry in [object, void, string, array, nullable] {
            self.types.insert(entry.type_hash, entry);
        }
        for kind in PrimitiveKind::ALL {
            let entry = TypeEntry::primitive(kind);
            self.types.insert(entry.type_hash, entry);
        }
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a new type. Fails if a type with the same hash exists.
    pub fn register(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.types.contains_key(&hash) {
            return Err(RegistrationError::DuplicateType {
                name: entry.qualified_name(),
            });
        }
        debug!(
            type_name = %entry.qualified_name(),
            members = entry.members.len(),
            methods = entry.methods.len(),
            "registered type"
        );
        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// Mutable access to an already registered type, for adding members.
    pub fn get_mut(&mut self, hash: TypeHash) -> Result<&mut TypeEntry, RegistrationError> {
        self.types
            .get_mut(&hash)
            .ok_or(RegistrationError::UnknownType { hash })
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    /// Entry holding the members of `data_type`: the shared `Array` or
    /// `Nullable` entry for those shapes, else the declared type.
    pub fn entry_for(&self, data_type: &DataType) -> Option<&TypeEntry> {
        if data_type.is_array() {
            self.get(primitives::ARRAY)
        } else if data_type.is_nullable() {
            self.get(primitives::NULLABLE)
        } else {
            self.get(data_type.type_hash)
        }
    }

    // ==========================================================================
    // Classification
    // ==========================================================================

    pub fn is_value_type(&self, data_type: &DataType) -> bool {
        if data_type.is_array() {
            return false;
        }
        if data_type.is_nullable() || data_type.primitive_kind().is_some() {
            return true;
        }
        self.get(data_type.type_hash)
            .is_some_and(TypeEntry::is_value_type)
    }

    /// Classes, interfaces, delegates, strings, arrays and `object`.
    pub fn is_reference_type(&self, data_type: &DataType) -> bool {
        !data_type.is_void() && !self.is_value_type(data_type)
    }

    /// Can hold `null`: reference types and `T?`.
    pub fn accepts_null(&self, data_type: &DataType) -> bool {
        data_type.is_nullable() || self.is_reference_type(data_type)
    }

    /// Underlying integer kind when `data_type` is an enum.
    pub fn enum_underlying(&self, data_type: &DataType) -> Option<PrimitiveKind> {
        if data_type.is_array() || data_type.nullable {
            return None;
        }
        self.get(data_type.type_hash)?.enum_underlying()
    }

    pub fn is_enum(&self, data_type: &DataType) -> bool {
        self.enum_underlying(data_type).is_some()
    }

    pub fn is_delegate(&self, data_type: &DataType) -> bool {
        !data_type.is_array()
            && !data_type.nullable
            && self
                .get(data_type.type_hash)
                .is_some_and(TypeEntry::is_delegate)
    }

    pub fn is_interface(&self, data_type: &DataType) -> bool {
        !data_type.is_array()
            && self
                .get(data_type.type_hash)
                .is_some_and(TypeEntry::is_interface)
    }

    // ==========================================================================
    // Hierarchy
    // ==========================================================================

    /// Direct base type.
    pub fn base_of(&self, data_type: &DataType) -> Option<DataType> {
        if data_type.is_array() {
            return Some(DataType::simple(primitives::ARRAY));
        }
        if data_type.is_nullable() {
            return Some(DataType::object());
        }
        self.get(data_type.type_hash)?
            .base
            .map(DataType::simple)
    }

    /// Number of base links between `data_type` and the root.
    pub fn hierarchy_depth(&self, data_type: &DataType) -> usize {
        let mut depth = 0;
        let mut current = *data_type;
        while let Some(base) = self.base_of(&current) {
            depth += 1;
            current = base;
            if depth >= MAX_HIERARCHY_DEPTH {
                break;
            }
        }
        depth
    }

    /// Whether a value of type `source` can be used where `target` is expected
    /// without any conversion beyond boxing or a reference upcast.
    pub fn is_assignable_from(&self, target: &DataType, source: &DataType) -> bool {
        if target == source || target.is_object() {
            return true;
        }
        if target.is_nullable() && target.underlying() == *source {
            return true;
        }
        if source.is_array() && target.is_array() {
            // Array covariance for reference elements.
            return match (source.element_type(), target.element_type()) {
                (Some(s), Some(t)) => {
                    self.is_reference_type(&s) && self.is_assignable_from(&t, &s)
                }
                _ => false,
            };
        }
        if target.is_array() || target.nullable {
            return false;
        }

        let mut seen = FxHashSet::default();
        let mut current = Some(*source);
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(ty) = current else { break };
            if ty == *target {
                return true;
            }
            if !ty.is_array() && self.implements(ty.type_hash, target.type_hash, &mut seen) {
                return true;
            }
            current = self.base_of(&ty);
        }
        false
    }

    fn implements(&self, ty: TypeHash, interface: TypeHash, seen: &mut FxHashSet<TypeHash>) -> bool {
        if !seen.insert(ty) {
            return false;
        }
        let Some(entry) = self.get(ty) else {
            return false;
        };
        entry
            .interfaces
            .iter()
            .any(|&i| i == interface || self.implements(i, interface, seen))
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    /// Walks `data_type` and, for instance queries, its bases. Static lookups
    /// only consider the declaring type itself.
    fn lookup_chain(&self, data_type: &DataType, is_static: bool) -> Vec<&TypeEntry> {
        let mut chain = Vec::new();
        let Some(first) = self.entry_for(data_type) else {
            return chain;
        };
        chain.push(first);
        if is_static {
            return chain;
        }
        let mut seen = FxHashSet::default();
        seen.insert(first.type_hash);
        let mut base = first.base;
        while let Some(hash) = base {
            let Some(entry) = self.get(hash) else { break };
            if !seen.insert(hash) {
                break;
            }
            chain.push(entry);
            base = entry.base;
        }
        chain
    }

    /// Fields and properties named `name` (case-insensitive), excluding indexers.
    /// A derived member hides base members of the same name.
    pub fn find_members(&self, data_type: &DataType, name: &str, is_static: bool) -> Vec<Arc<MemberEntry>> {
        let mut found: Vec<Arc<MemberEntry>> = Vec::new();
        for entry in self.lookup_chain(data_type, is_static) {
            for member in &entry.members {
                if member.is_static != is_static || member.is_indexer() || !member.name_matches(name) {
                    continue;
                }
                if found.iter().any(|f| f.name == member.name && f.declaring_type != member.declaring_type) {
                    continue;
                }
                found.push(Arc::clone(member));
            }
        }
        found
    }

    /// Method overloads named `name`. A derived method with the same parameter
    /// list overrides the base one.
    pub fn find_methods(&self, data_type: &DataType, name: &str, is_static: bool) -> Vec<Arc<MethodEntry>> {
        let mut found: Vec<Arc<MethodEntry>> = Vec::new();
        for entry in self.lookup_chain(data_type, is_static) {
            for method in &entry.methods {
                if method.is_static != is_static || !method.name_matches(name) {
                    continue;
                }
                let overridden = found.iter().any(|f| {
                    f.declaring_type != method.declaring_type
                        && f.name == method.name
                        && f.param_types().eq(method.param_types())
                });
                if !overridden {
                    found.push(Arc::clone(method));
                }
            }
        }
        found
    }

    /// Indexed instance properties, inherited ones included.
    pub fn indexers(&self, data_type: &DataType) -> Vec<Arc<MemberEntry>> {
        self.lookup_chain(data_type, false)
            .into_iter()
            .flat_map(|entry| entry.members.iter())
            .filter(|m| !m.is_static && m.is_indexer())
            .cloned()
            .collect()
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    /// Short name (`Int32`, `String[]`, `Int32?`).
    pub fn type_name(&self, data_type: &DataType) -> String {
        self.render(data_type, |entry| entry.name.clone())
    }

    /// Namespace-qualified name (`System.Int32`), used in diagnostics.
    pub fn qualified_type_name(&self, data_type: &DataType) -> String {
        self.render(data_type, TypeEntry::qualified_name)
    }

    fn render(&self, data_type: &DataType, name_of: impl Fn(&TypeEntry) -> String) -> String {
        let mut out = match self.get(data_type.type_hash) {
            Some(entry) => name_of(entry),
            None => data_type.type_hash.to_string(),
        };
        if data_type.nullable {
            out.push('?');
        }
        for _ in 0..data_type.rank {
            out.push_str("[]");
        }
        out
    }

    /// `Double Max(Double, Double)`
    pub fn describe_method(&self, method: &MethodEntry) -> String {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| self.type_name(&p.data_type))
            .collect();
        format!(
            "{} {}({})",
            self.type_name(&method.return_type),
            method.name,
            params.join(", ")
        )
    }

    /// `Double PI`, or `Char Chars [Int32]` for an indexer.
    pub fn describe_member(&self, member: &MemberEntry) -> String {
        let mut out = format!("{} {}", self.type_name(&member.data_type), member.name);
        if member.is_indexer() {
            let params: Vec<String> = member
                .params
                .iter()
                .map(|p| self.type_name(&p.data_type))
                .collect();
            out.push_str(&format!(" [{}]", params.join(", ")));
        }
        out
    }

    /// Name of the type declaring a member, qualified.
    pub fn declaring_type_name(&self, hash: TypeHash) -> String {
        self.qualified_type_name(&DataType::simple(hash))
    }

    /// Ambiguity line for a method: signature plus declaring type.
    pub fn method_candidate(&self, method: &MethodEntry) -> String {
        format!(
            "{} (in {})",
            self.describe_method(method),
            self.declaring_type_name(method.declaring_type)
        )
    }

    pub fn member_candidate(&self, member: &MemberEntry) -> String {
        format!(
            "{} (in {})",
            self.describe_member(member),
            self.declaring_type_name(member.declaring_type)
        )
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{NativeFn, Param, Value};

    fn animal_registry() -> (TypeRegistry, DataType, DataType, DataType) {
        let mut registry = TypeRegistry::with_primitives();
        let named = TypeEntry::interface("Zoo", "INamed");
        let named_hash = registry.register(named).unwrap();
        let animal = TypeEntry::class("Zoo", "Animal")
            .with_interface(named_hash)
            .with_member(MemberEntry::property(
                "Name",
                DataType::string(),
                NativeFn::constant(Value::from("animal")),
            ))
            .with_method(MethodEntry::instance(
                "Speak",
                vec![],
                DataType::string(),
                NativeFn::constant(Value::from("...")),
            ));
        let animal_hash = registry.register(animal).unwrap();
        let dog = TypeEntry::class("Zoo", "Dog")
            .with_base(animal_hash)
            .with_method(MethodEntry::instance(
                "Speak",
                vec![],
                DataType::string(),
                NativeFn::constant(Value::from("woof")),
            ))
            .with_method(MethodEntry::instance(
                "Speak",
                vec![Param::new("times", DataType::int32())],
                DataType::string(),
                NativeFn::constant(Value::from("woof woof")),
            ));
        let dog_hash = registry.register(dog).unwrap();
        (
            registry,
            DataType::simple(named_hash),
            DataType::simple(animal_hash),
            DataType::simple(dog_hash),
        )
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = TypeRegistry::with_primitives();
        let err = registry
            .register(TypeEntry::class("System", "String"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateType {
                name: "System.String".into()
            }
        );
    }

    #[test]
    fn assignability_walks_bases_and_interfaces() {
        let (registry, named, animal, dog) = animal_registry();
        assert!(registry.is_assignable_from(&animal, &dog));
        assert!(registry.is_assignable_from(&named, &dog));
        assert!(!registry.is_assignable_from(&dog, &animal));
        assert!(registry.is_assignable_from(&DataType::object(), &DataType::int32()));
        assert!(registry.is_assignable_from(&animal.array_of(), &dog.array_of()));
        assert!(!registry.is_assignable_from(
            &DataType::object().array_of(),
            &DataType::int32().array_of()
        ));
        assert!(registry.is_assignable_from(
            &DataType::simple(primitives::ARRAY),
            &DataType::int32().array_of()
        ));
        assert!(registry.is_assignable_from(
            &DataType::nullable(primitives::INT32),
            &DataType::int32()
        ));
    }

    #[test]
    fn hierarchy_depth_counts_base_links() {
        let (registry, _, animal, dog) = animal_registry();
        assert_eq!(registry.hierarchy_depth(&DataType::object()), 0);
        assert_eq!(registry.hierarchy_depth(&animal), 1);
        assert_eq!(registry.hierarchy_depth(&dog), 2);
        assert_eq!(registry.hierarchy_depth(&DataType::int32().array_of()), 2);
    }

    #[test]
    fn instance_members_are_inherited_and_methods_overridden() {
        let (registry, _, _, dog) = animal_registry();
        let name = registry.find_members(&dog, "name", false);
        assert_eq!(name.len(), 1);
        assert!(registry.find_members(&dog, "name", true).is_empty());

        let speak = registry.find_methods(&dog, "SPEAK", false);
        assert_eq!(speak.len(), 2);
        assert!(speak.iter().all(|m| m.declaring_type == dog.type_hash));
    }

    #[test]
    fn value_and_reference_classification() {
        let (registry, named, animal, _) = animal_registry();
        assert!(registry.is_value_type(&DataType::int32()));
        assert!(registry.is_value_type(&DataType::nullable(primitives::INT32)));
        assert!(registry.is_reference_type(&DataType::string()));
        assert!(registry.is_reference_type(&animal));
        assert!(registry.is_interface(&named));
        assert!(registry.accepts_null(&DataType::nullable(primitives::INT32)));
        assert!(!registry.accepts_null(&DataType::int32()));
    }

    #[test]
    fn names_render_shapes() {
        let registry = TypeRegistry::with_primitives();
        assert_eq!(registry.type_name(&DataType::int32()), "Int32");
        assert_eq!(
            registry.qualified_type_name(&DataType::nullable(primitives::INT32)),
            "System.Int32?"
        );
        assert_eq!(
            registry.type_name(&DataType::string().array_of().array_of()),
            "String[][]"
        );
    }
}
