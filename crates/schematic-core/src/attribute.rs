//! Entity attributes.
//!
//! An [`Attribute`] is one column of an entity. Its fields are private so the
//! primary-key invariant always holds: a key attribute is never nullable and
//! always unique. [`AttributeList`] keeps attributes in declared order and
//! supports reordering; foreign keys refer to attributes by name, so moving
//! an attribute never invalidates a reference.

use std::slice;

use log::trace;

use crate::graph::Extensions;

/// A reference from an attribute to an attribute of another entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    entity_id: String,
    entity_name: String,
    attribute_name: String,
}

impl ForeignKey {
    /// Creates a new foreign key.
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Node id of the referenced entity.
    /// * `entity_name` - Display name of the referenced entity.
    /// * `attribute_name` - Name of the referenced attribute.
    pub fn new(
        entity_id: impl Into<String>,
        entity_name: impl Into<String>,
        attribute_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_name: entity_name.into(),
            attribute_name: attribute_name.into(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub(crate) fn set_attribute_name(&mut self, name: impl Into<String>) {
        self.attribute_name = name.into();
    }
}

/// A single entity attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    data_type: String,
    size: Option<String>,
    primary: bool,
    unique: bool,
    nullable: bool,
    default: Option<String>,
    foreign_key: Option<ForeignKey>,
    extensions: Extensions,
}

impl Attribute {
    /// Create a nullable, non-unique attribute.
    ///
    /// # Example
    ///
    /// ```
    /// # use schematic_core::Attribute;
    /// let id = Attribute::new("id", "INT").with_primary(true);
    /// assert!(id.is_unique());
    /// assert!(!id.is_nullable());
    /// ```
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            size: None,
            primary: false,
            unique: false,
            nullable: true,
            default: None,
            foreign_key: None,
            extensions: Extensions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Size arguments as written, e.g. `255` or `10,2`.
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Default value expression, verbatim.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.foreign_key.as_ref()
    }

    /// Unrecognized attribute fields carried through a package round trip.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.set_primary(primary);
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.set_unique(unique);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.set_nullable(nullable);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_data_type(&mut self, data_type: impl Into<String>) {
        self.data_type = data_type.into();
    }

    pub fn set_size(&mut self, size: Option<String>) {
        self.size = size;
    }

    /// Marks the attribute as (part of) the primary key.
    ///
    /// Setting `true` also makes the attribute unique and non-nullable.
    /// Clearing the flag leaves both untouched.
    pub fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
        if primary {
            self.unique = true;
            self.nullable = false;
        }
    }

    /// Sets uniqueness. Ignored when clearing uniqueness on a key attribute.
    pub fn set_unique(&mut self, unique: bool) {
        if self.primary && !unique {
            trace!(attribute = self.name; "Ignoring unique=false on primary key");
            return;
        }
        self.unique = unique;
    }

    /// Sets nullability. Ignored when making a key attribute nullable.
    pub fn set_nullable(&mut self, nullable: bool) {
        if self.primary && nullable {
            trace!(attribute = self.name; "Ignoring nullable=true on primary key");
            return;
        }
        self.nullable = nullable;
    }

    pub fn set_default(&mut self, default: Option<String>) {
        self.default = default;
    }

    pub fn set_foreign_key(&mut self, foreign_key: Option<ForeignKey>) {
        self.foreign_key = foreign_key;
    }

    pub(crate) fn foreign_key_mut(&mut self) -> Option<&mut ForeignKey> {
        self.foreign_key.as_mut()
    }
}

/// The ordered attribute bag of an entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates attributes in declared order.
    pub fn iter(&self) -> slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Attribute> {
        self.attributes.iter_mut()
    }

    /// Appends an attribute.
    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Inserts an attribute at `index`, clamped to the end of the list.
    pub fn insert(&mut self, index: usize, attribute: Attribute) {
        let index = index.min(self.attributes.len());
        self.attributes.insert(index, attribute);
    }

    /// Removes the first attribute called `name`.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let index = self.position(name)?;
        Some(self.attributes.remove(index))
    }

    /// Moves the attribute called `name` to `index` (clamped).
    ///
    /// Returns `false` if no such attribute exists.
    pub fn move_to(&mut self, name: &str, index: usize) -> bool {
        let Some(from) = self.position(name) else {
            return false;
        };
        let attribute = self.attributes.remove(from);
        let index = index.min(self.attributes.len());
        self.attributes.insert(index, attribute);
        true
    }

    /// Looks up an attribute by exact name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Index of the attribute called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Primary-key attributes in declared order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.primary)
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl From<Vec<Attribute>> for AttributeList {
    fn from(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl IntoIterator for AttributeList {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}
