//! Object kinds: URIs, payload builders and content types per ADT type

use adtkit_domain::{
    AdtObjectConfig, ClassConfig, DataElementConfig, DomainConfig, OperationOptions,
    ProgramConfig,
};

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const NS_ADTCORE: &str = "http://www.sap.com/adt/core";

/// How an object's content is updated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Source code at `<uri>/source/main`
    Source,
    /// Full object XML at `<uri>`
    Xml,
}

/// Body of an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    pub uri: String,
    pub content_type: &'static str,
    pub body: String,
}

/// One ADT object type.
///
/// The orchestrator is generic over this trait; everything that differs
/// between classes, domains, data elements and programs lives here.
pub trait ObjectKind: Send + Sync + 'static {
    type Config: AdtObjectConfig + Send + Sync;

    /// Short name used in logs.
    const LABEL: &'static str;
    /// ADT object type, e.g. `CLAS/OC`.
    const OBJECT_TYPE: &'static str;
    /// Collection the object is created in.
    const COLLECTION_URI: &'static str;
    const VALIDATION_URI: &'static str;
    /// Media type of the object XML.
    const CONTENT_TYPE: &'static str;
    const FORMAT: PayloadFormat;

    /// Object XML describing `config`, used as create body.
    fn object_xml(config: &Self::Config) -> String;

    fn object_uri(name: &str) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(name.to_ascii_lowercase().as_bytes()).collect();
        format!("{}/{encoded}", Self::COLLECTION_URI)
    }

    /// URI read by `read`: the source for source kinds, the object itself
    /// otherwise.
    fn read_uri(name: &str) -> String {
        match Self::FORMAT {
            PayloadFormat::Source => format!("{}/source/main", Self::object_uri(name)),
            PayloadFormat::Xml => Self::object_uri(name),
        }
    }

    /// Accept header of `read`.
    fn read_accept() -> &'static str {
        match Self::FORMAT {
            PayloadFormat::Source => "text/plain",
            PayloadFormat::Xml => Self::CONTENT_TYPE,
        }
    }

    /// Update body for `config`, or `None` when there is nothing to send.
    ///
    /// Source kinds send `options.source_code`; XML kinds send
    /// `options.xml_content`, falling back to [`ObjectKind::object_xml`].
    fn update_payload(config: &Self::Config, options: &OperationOptions) -> Option<UpdatePayload> {
        let uri = Self::object_uri(config.name());
        match Self::FORMAT {
            PayloadFormat::Source => options.source_code.clone().map(|body| UpdatePayload {
                uri: format!("{uri}/source/main"),
                content_type: CONTENT_TYPE_TEXT,
                body,
            }),
            PayloadFormat::Xml => Some(UpdatePayload {
                uri,
                content_type: Self::CONTENT_TYPE,
                body: options.xml_content.clone().unwrap_or_else(|| Self::object_xml(config)),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassKind;

impl ObjectKind for ClassKind {
    type Config = ClassConfig;

    const LABEL: &'static str = "class";
    const OBJECT_TYPE: &'static str = "CLAS/OC";
    const COLLECTION_URI: &'static str = "/sap/bc/adt/oo/classes";
    const VALIDATION_URI: &'static str = "/sap/bc/adt/oo/validation/objectname";
    const CONTENT_TYPE: &'static str = "application/vnd.sap.adt.oo.classes.v4+xml";
    const FORMAT: PayloadFormat = PayloadFormat::Source;

    fn object_xml(config: &ClassConfig) -> String {
        let superclass = config.superclass.as_deref().map_or_else(String::new, |name| {
            format!(r#"<class:superClassRef adtcore:name="{}"/>"#, escape(&name.to_uppercase()))
        });
        format!(
            r#"{XML_DECLARATION}<class:abapClass xmlns:class="http://www.sap.com/adt/oo/classes" xmlns:adtcore="{NS_ADTCORE}" {header} class:final="{final_}" class:abstract="{abstract_}" class:visibility="{visibility}">{package}{superclass}</class:abapClass>"#,
            header = header_attributes(config, Self::OBJECT_TYPE),
            final_ = config.is_final,
            abstract_ = config.is_abstract,
            visibility = if config.create_protected { "protected" } else { "public" },
            package = package_ref(config),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramKind;

impl ObjectKind for ProgramKind {
    type Config = ProgramConfig;

    const LABEL: &'static str = "program";
    const OBJECT_TYPE: &'static str = "PROG/P";
    const COLLECTION_URI: &'static str = "/sap/bc/adt/programs/programs";
    const VALIDATION_URI: &'static str = "/sap/bc/adt/programs/validation";
    const CONTENT_TYPE: &'static str = "application/vnd.sap.adt.programs.programs.v2+xml";
    const FORMAT: PayloadFormat = PayloadFormat::Source;

    fn object_xml(config: &ProgramConfig) -> String {
        let application = config
            .application
            .as_deref()
            .map_or_else(String::new, |app| format!(r#" program:application="{}""#, escape(app)));
        format!(
            r#"{XML_DECLARATION}<program:abapProgram xmlns:program="http://www.sap.com/adt/programs/programs" xmlns:adtcore="{NS_ADTCORE}" {header} program:programType="{program_type}"{application}>{package}</program:abapProgram>"#,
            header = header_attributes(config, Self::OBJECT_TYPE),
            program_type = config.program_type.as_str(),
            package = package_ref(config),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DomainKind;

impl ObjectKind for DomainKind {
    type Config = DomainConfig;

    const LABEL: &'static str = "domain";
    const OBJECT_TYPE: &'static str = "DOMA/DD";
    const COLLECTION_URI: &'static str = "/sap/bc/adt/ddic/domains";
    const VALIDATION_URI: &'static str = "/sap/bc/adt/ddic/domains/validation";
    const CONTENT_TYPE: &'static str = "application/vnd.sap.adt.domains.v2+xml";
    const FORMAT: PayloadFormat = PayloadFormat::Xml;

    fn object_xml(config: &DomainConfig) -> String {
        let fixed_values: String = config
            .fixed_values
            .iter()
            .map(|value| {
                format!(
                    "<doma:fixValue><doma:low>{}</doma:low><doma:high>{}</doma:high><doma:text>{}</doma:text></doma:fixValue>",
                    escape(&value.low),
                    escape(value.high.as_deref().unwrap_or_default()),
                    escape(&value.text),
                )
            })
            .collect();
        let value_table = config.value_table.as_deref().map_or_else(
            || "<doma:valueTableRef/>".to_string(),
            |table| format!(r#"<doma:valueTableRef adtcore:name="{}"/>"#, escape(table)),
        );

        format!(
            r#"{XML_DECLARATION}<doma:domain xmlns:doma="http://www.sap.com/dictionary/domain" xmlns:adtcore="{NS_ADTCORE}" {header}>{package}<doma:content><doma:typeInformation><doma:datatype>{datatype}</doma:datatype><doma:length>{length:06}</doma:length><doma:decimals>{decimals:06}</doma:decimals></doma:typeInformation><doma:outputInformation><doma:conversionExit>{conversion_exit}</doma:conversionExit><doma:signExists>{sign}</doma:signExists><doma:lowercase>{lowercase}</doma:lowercase></doma:outputInformation><doma:valueInformation>{value_table}<doma:fixValues>{fixed_values}</doma:fixValues></doma:valueInformation></doma:content></doma:domain>"#,
            header = header_attributes(config, Self::OBJECT_TYPE),
            package = package_ref(config),
            datatype = escape(config.datatype.as_deref().unwrap_or_default()),
            length = config.length.unwrap_or_default(),
            decimals = config.decimals.unwrap_or_default(),
            conversion_exit = escape(config.conversion_exit.as_deref().unwrap_or_default()),
            sign = config.sign_exists,
            lowercase = config.lowercase,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataElementKind;

impl ObjectKind for DataElementKind {
    type Config = DataElementConfig;

    const LABEL: &'static str = "data element";
    const OBJECT_TYPE: &'static str = "DTEL/DE";
    const COLLECTION_URI: &'static str = "/sap/bc/adt/ddic/dataelements";
    const VALIDATION_URI: &'static str = "/sap/bc/adt/ddic/dataelements/validation";
    const CONTENT_TYPE: &'static str = "application/vnd.sap.adt.dataelements.v2+xml";
    const FORMAT: PayloadFormat = PayloadFormat::Xml;

    fn object_xml(config: &DataElementConfig) -> String {
        let text = |value: &Option<String>| escape(value.as_deref().unwrap_or_default());
        let label_len = |value: &Option<String>| value.as_deref().map_or(0, |v| v.chars().count());

        format!(
            r#"{XML_DECLARATION}<blue:wbobj xmlns:blue="http://www.sap.com/wbobj/dictionary/dtel" xmlns:dtel="http://www.sap.com/adt/dictionary/dataelements" xmlns:adtcore="{NS_ADTCORE}" {header}>{package}<dtel:dataElement><dtel:typeKind>{type_kind}</dtel:typeKind><dtel:typeName>{type_name}</dtel:typeName><dtel:dataType/><dtel:dataTypeLength>{length:06}</dtel:dataTypeLength><dtel:dataTypeDecimals>{decimals:06}</dtel:dataTypeDecimals><dtel:shortFieldLabel>{short}</dtel:shortFieldLabel><dtel:shortFieldLength>{short_len}</dtel:shortFieldLength><dtel:mediumFieldLabel>{medium}</dtel:mediumFieldLabel><dtel:mediumFieldLength>{medium_len}</dtel:mediumFieldLength><dtel:longFieldLabel>{long}</dtel:longFieldLabel><dtel:longFieldLength>{long_len}</dtel:longFieldLength><dtel:headingFieldLabel>{heading}</dtel:headingFieldLabel><dtel:headingFieldLength>{heading_len}</dtel:headingFieldLength><dtel:searchHelp>{search_help}</dtel:searchHelp></dtel:dataElement></blue:wbobj>"#,
            header = header_attributes(config, Self::OBJECT_TYPE),
            package = package_ref(config),
            type_kind = config.type_kind.as_str(),
            type_name = escape(&config.type_name.as_deref().unwrap_or_default().to_uppercase()),
            length = config.length.unwrap_or_default(),
            decimals = config.decimals.unwrap_or_default(),
            short = text(&config.short_label),
            short_len = label_len(&config.short_label),
            medium = text(&config.medium_label),
            medium_len = label_len(&config.medium_label),
            long = text(&config.long_label),
            long_len = label_len(&config.long_label),
            heading = text(&config.heading_label),
            heading_len = label_len(&config.heading_label),
            search_help = text(&config.search_help),
        )
    }
}

/// `adtcore:description`, `adtcore:name` and `adtcore:type` attributes.
fn header_attributes(config: &impl AdtObjectConfig, object_type: &str) -> String {
    format!(
        r#"adtcore:description="{}" adtcore:name="{}" adtcore:type="{object_type}""#,
        escape(config.description().unwrap_or_default()),
        escape(&config.name().to_uppercase()),
    )
}

fn package_ref(config: &impl AdtObjectConfig) -> String {
    config.package_name().map_or_else(String::new, |package| {
        format!(r#"<adtcore:packageRef adtcore:name="{}"/>"#, escape(&package.to_uppercase()))
    })
}

/// Escape text for use in XML content and attribute values.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
