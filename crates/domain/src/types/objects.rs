//! Per-kind object configurations

use serde::{Deserialize, Serialize};

/// Identifying fields shared by every object configuration.
pub trait AdtObjectConfig: Send + Sync {
    /// Object name as known to the ABAP repository.
    fn name(&self) -> &str;

    /// Package; required for create and validate.
    fn package_name(&self) -> Option<&str>;

    /// Description; required for create and validate.
    fn description(&self) -> Option<&str>;

    /// Transport request used by create, update and delete.
    fn transport_request(&self) -> Option<&str>;
}

macro_rules! impl_object_config {
    ($ty:ty, $name:ident) => {
        impl AdtObjectConfig for $ty {
            fn name(&self) -> &str {
                &self.$name
            }

            fn package_name(&self) -> Option<&str> {
                self.package_name.as_deref()
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn transport_request(&self) -> Option<&str> {
                self.transport_request.as_deref()
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassConfig {
    pub class_name: String,
    pub package_name: Option<String>,
    pub description: Option<String>,
    pub transport_request: Option<String>,
    pub superclass: Option<String>,
    pub is_final: bool,
    pub is_abstract: bool,
    pub create_protected: bool,
}

impl ClassConfig {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(), is_final: true, ..Self::default() }
    }
}

impl_object_config!(ClassConfig, class_name);

/// Single fixed value of a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedValue {
    pub low: String,
    pub high: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainConfig {
    pub domain_name: String,
    pub package_name: Option<String>,
    pub description: Option<String>,
    pub transport_request: Option<String>,
    /// Built-in dictionary type, e.g. `CHAR`, `NUMC`, `DEC`
    pub datatype: Option<String>,
    pub length: Option<u32>,
    pub decimals: Option<u32>,
    pub conversion_exit: Option<String>,
    pub lowercase: bool,
    pub sign_exists: bool,
    pub value_table: Option<String>,
    pub fixed_values: Vec<FixedValue>,
}

impl DomainConfig {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self { domain_name: domain_name.into(), ..Self::default() }
    }
}

impl_object_config!(DomainConfig, domain_name);

/// How a data element gets its technical type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataElementTypeKind {
    #[default]
    Domain,
    PredefinedAbapType,
}

impl DataElementTypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::PredefinedAbapType => "predefinedAbapType",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataElementConfig {
    pub data_element_name: String,
    pub package_name: Option<String>,
    pub description: Option<String>,
    pub transport_request: Option<String>,
    pub type_kind: DataElementTypeKind,
    /// Domain name or predefined type name, depending on `type_kind`
    pub type_name: Option<String>,
    pub length: Option<u32>,
    pub decimals: Option<u32>,
    pub short_label: Option<String>,
    pub medium_label: Option<String>,
    pub long_label: Option<String>,
    pub heading_label: Option<String>,
    pub search_help: Option<String>,
}

impl DataElementConfig {
    pub fn new(data_element_name: impl Into<String>) -> Self {
        Self { data_element_name: data_element_name.into(), ..Self::default() }
    }
}

impl_object_config!(DataElementConfig, data_element_name);

/// ABAP program type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramType {
    #[default]
    Executable,
    Include,
    ModulePool,
    SubroutinePool,
}

impl ProgramType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executable => "executableProgram",
            Self::Include => "includeProgram",
            Self::ModulePool => "modulePool",
            Self::SubroutinePool => "subroutinePool",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramConfig {
    pub program_name: String,
    pub package_name: Option<String>,
    pub description: Option<String>,
    pub transport_request: Option<String>,
    pub program_type: ProgramType,
    pub application: Option<String>,
}

impl ProgramConfig {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self { program_name: program_name.into(), ..Self::default() }
    }
}

impl_object_config!(ProgramConfig, program_name);
