//! Storable types shared by the codec tests.

use keepsake_types::{RecordId, Timestamp};

use crate::{Codec, CodecResult, Document, DocumentReader, Storable};

/// Base fields shared by named entities, embedded by value.
#[derive(Clone, Debug, PartialEq)]
pub struct Named {
    pub id: RecordId,
    pub name: String,
}

impl Named {
    pub fn export(&self, doc: Document) -> Document {
        doc.set("id", &self.id).set("name", &self.name)
    }

    pub fn import(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            id: reader.get("id")?,
            name: reader.get_with_legacy("name", &["full_name"])?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Address {
    pub city: String,
}

impl Address {
    pub fn new(city: &str) -> Self {
        Self { city: city.to_string() }
    }
}

impl Storable for Address {
    const TYPE_NAME: &'static str = "Address";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("city", &self.city)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self { city: reader.get("city")? })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pet {
    pub name: String,
    pub legs: u8,
}

impl Pet {
    pub fn new(name: &str, legs: u8) -> Self {
        Self {
            name: name.to_string(),
            legs,
        }
    }
}

impl Storable for Pet {
    const TYPE_NAME: &'static str = "Pet";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("name", &self.name).set("legs", self.legs)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            name: reader.get("name")?,
            legs: reader.get("legs")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub base: Named,
    pub age: u32,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub address: Address,
    pub previous_address: Option<Address>,
    pub pets: Vec<Pet>,
    pub joined: Timestamp,
}

impl Storable for Person {
    const TYPE_NAME: &'static str = "Person";

    fn write_fields(&self, doc: Document) -> Document {
        self.base
            .export(doc)
            .set("age", self.age)
            .set("email", self.email.clone())
            .set("tags", self.tags.clone())
            .set_object("address", &self.address)
            .set_optional_object("previous_address", self.previous_address.as_ref())
            .set_objects("pets", &self.pets)
            .set("joined", self.joined)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            base: Named::import(reader)?,
            age: reader.get_with_legacy("age", &["years"])?,
            email: reader.get_optional("email", &[]),
            tags: reader.get("tags")?,
            address: reader.get_nested_object("address", &[])?,
            previous_address: reader.get_optional_nested_object("previous_address", &[]),
            pets: reader.get_nested_array("pets", &[])?,
            joined: reader.get("joined")?,
        })
    }
}

/// Three levels deep: a household holds a person who holds a list of pets.
#[derive(Clone, Debug, PartialEq)]
pub struct Household {
    pub label: String,
    pub head: Person,
}

impl Storable for Household {
    const TYPE_NAME: &'static str = "Household";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("label", &self.label).set_object("head", &self.head)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            label: reader.get("label")?,
            head: reader.get_nested_object("head", &[])?,
        })
    }
}

pub fn sample_household() -> Household {
    Household {
        label: "Lovelace".into(),
        head: sample_person(),
    }
}

pub fn sample_person() -> Person {
    Person {
        base: Named {
            id: RecordId::parse("p-1").unwrap(),
            name: "Ada".into(),
        },
        age: 36,
        email: Some("ada@example.com".into()),
        tags: vec!["math".into(), "engines".into()],
        address: Address::new("London"),
        previous_address: Some(Address::new("Marylebone")),
        pets: vec![Pet::new("Rex", 4), Pet::new("Tweety", 2)],
        joined: Timestamp::from_millis(1_709_296_245_123).unwrap(),
    }
}

/// A codec with every fixture type registered.
pub fn codec() -> Codec {
    let codec = Codec::default();
    codec.register::<Address>().unwrap();
    codec.register::<Pet>().unwrap();
    codec.register::<Person>().unwrap();
    codec.register::<Household>().unwrap();
    codec
}
