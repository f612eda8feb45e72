use super::SchemaValidator;
use crate::loader::ResourceLoader;
use crate::media_type::MediaType;
use crate::violations::{format_schema_finding, Severity, Violation, Violations};
use libxml::error::{StructuredError, XmlErrorLevel};
use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

const ROOT_SCHEMA: &str = "__schema__.xsd";

/// Validates XML bodies against XSD schemas via libxml2.
///
/// When a resource loader is bound, schemas referenced through
/// `xs:import`/`xs:include`/`xs:redefine` are fetched through it; unbound
/// validators let unresolved references fail the schema compile.
#[derive(Default)]
pub struct XmlSchemaValidator {
    loader: Option<Arc<dyn ResourceLoader>>,
}

impl XmlSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, content: &str, schema: &str, violations: &mut Violations) -> Result<(), String> {
        // Fetched fragments must stay on disk until compilation is done.
        let _staged: Option<TempDir>;
        let mut parser = match &self.loader {
            Some(loader) => {
                let staged = stage_schema(schema, loader.as_ref())?;
                let root = staged.path().join(ROOT_SCHEMA);
                let parser = SchemaParserContext::from_file(&root.to_string_lossy());
                _staged = Some(staged);
                parser
            }
            None => {
                _staged = None;
                SchemaParserContext::from_buffer(schema)
            }
        };

        let mut schema_context =
            SchemaValidationContext::from_parser(&mut parser).map_err(|errors| compile_failure(&errors))?;

        let document = match Parser::default().parse_string(content) {
            Ok(document) => document,
            Err(err) => {
                violations.add(Violation::new(
                    Severity::Fatal,
                    format!("malformed document: {:?}", err),
                ));
                return Ok(());
            }
        };

        if let Err(diagnostics) = schema_context.validate_document(&document) {
            for diagnostic in &diagnostics {
                violations.add(schema_violation(diagnostic));
            }
        }
        Ok(())
    }
}

impl SchemaValidator for XmlSchemaValidator {
    fn supports(&self, media_type: &MediaType) -> bool {
        media_type.is_compatible_with(&MediaType::constant("text", "xml"))
            || media_type.is_compatible_with(&MediaType::constant("application", "xml"))
    }

    fn with_resource_loader(&self, loader: Arc<dyn ResourceLoader>) -> Arc<dyn SchemaValidator> {
        Arc::new(Self {
            loader: Some(loader),
        })
    }

    fn validate(&self, content: &str, schema: &str, violations: &mut Violations) {
        if let Err(failure) = self.run(content, schema, violations) {
            // One violation per schema-level failure; the session keeps going.
            violations.add(Violation::new(
                Severity::Error,
                format!("invalid schema: {}", failure),
            ));
        }
    }
}

fn schema_violation(error: &StructuredError) -> Violation {
    let severity = match error.level {
        XmlErrorLevel::Warning => Severity::Warning,
        XmlErrorLevel::Fatal => Severity::Fatal,
        _ => Severity::Error,
    };
    let message = error.message.as_deref().unwrap_or("unknown error").trim();
    Violation::new(
        severity,
        format_schema_finding(error.line.unwrap_or(0), error.col.unwrap_or(0), message),
    )
}

fn compile_failure(errors: &[StructuredError]) -> String {
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|error| error.message.as_deref())
        .map(str::trim)
        .collect();
    if messages.is_empty() {
        "unknown schema error".to_string()
    } else {
        messages.join("; ")
    }
}

/// Writes the schema and everything it references into a temp directory so
/// the schema compiler can resolve the references from disk.
fn stage_schema(schema: &str, loader: &dyn ResourceLoader) -> Result<TempDir, String> {
    let staged = TempDir::new().map_err(|err| format!("cannot stage schema: {}", err))?;
    write_fragment(staged.path(), Path::new(ROOT_SCHEMA), schema.as_bytes())?;

    let mut pending = external_references(schema);
    let mut seen = HashSet::new();
    while let Some(location) = pending.pop() {
        if !seen.insert(location.clone()) {
            continue;
        }
        // Locations escaping the staging directory are left for the schema
        // compiler to report as unresolvable.
        let Some(relative) = relative_path(&location) else {
            continue;
        };
        let bytes = loader.fetch(&location).map_err(|err| err.to_string())?;
        if let Ok(nested) = std::str::from_utf8(&bytes) {
            pending.extend(external_references(nested));
        }
        debug!(location = %location, "staged referenced schema");
        write_fragment(staged.path(), &relative, &bytes)?;
    }
    Ok(staged)
}

/// schemaLocation values of `xs:import`, `xs:include` and `xs:redefine`.
fn external_references(schema: &str) -> Vec<String> {
    let mut locations = Vec::new();
    let mut reader = Reader::from_str(schema);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                if !matches!(
                    element.local_name().as_ref(),
                    b"import" | b"include" | b"redefine"
                ) {
                    continue;
                }
                for attribute in element.attributes().flatten() {
                    if attribute.key.local_name().as_ref() == b"schemaLocation" {
                        if let Ok(value) = attribute.unescape_value() {
                            locations.push(value.into_owned());
                        }
                    }
                }
            }
            // Malformed schema text surfaces from the schema compiler itself.
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    locations
}

fn relative_path(location: &str) -> Option<PathBuf> {
    let path = Path::new(location);
    if path.components().all(|c| matches!(c, Component::Normal(_))) {
        Some(path.to_path_buf())
    } else {
        None
    }
}

fn write_fragment(base: &Path, relative: &Path, bytes: &[u8]) -> Result<(), String> {
    let target = base.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|err| format!("cannot stage schema: {}", err))?;
    }
    std::fs::write(&target, bytes).map_err(|err| format!("cannot stage schema: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    const PERSON_SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="person">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    const ITEM_TYPE_SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="ItemType">
    <xs:restriction base="xs:string"/>
  </xs:simpleType>
</xs:schema>"#;

    const INCLUDING_SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="item.xsd"/>
  <xs:element name="item" type="ItemType"/>
</xs:schema>"#;

    fn validate(validator: &XmlSchemaValidator, content: &str, schema: &str) -> Violations {
        let mut violations = Violations::new();
        validator.validate(content, schema, &mut violations);
        violations
    }

    #[test]
    fn supports_xml_media_types_only() {
        let validator = XmlSchemaValidator::new();
        assert!(validator.supports(&MediaType::parse("application/xml").unwrap()));
        assert!(validator.supports(&MediaType::parse("text/xml;charset=utf-8").unwrap()));
        assert!(!validator.supports(&MediaType::parse("application/json").unwrap()));
    }

    #[test]
    fn conforming_document_yields_no_violations() {
        let violations = validate(
            &XmlSchemaValidator::new(),
            "<person><name>nidi</name></person>",
            PERSON_SCHEMA,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn structural_defect_yields_violation_with_position() {
        let violations = validate(
            &XmlSchemaValidator::new(),
            "<person><age>7</age></person>",
            PERSON_SCHEMA,
        );
        assert!(!violations.is_empty());
        let first = violations.iter().next().unwrap();
        assert_eq!(first.severity, Severity::Error);
        assert!(first.message.contains("line "), "message: {}", first.message);
    }

    #[test]
    fn broken_schema_yields_exactly_one_violation() {
        let violations = validate(
            &XmlSchemaValidator::new(),
            "<person/>",
            "this is not a schema",
        );
        assert_eq!(violations.len(), 1);
        let first = violations.iter().next().unwrap();
        assert!(first.message.starts_with("invalid schema:"));
    }

    #[test]
    fn malformed_document_yields_fatal_violation() {
        let violations = validate(&XmlSchemaValidator::new(), "<person>", PERSON_SCHEMA);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.iter().next().unwrap().severity, Severity::Fatal);
    }

    #[test]
    fn bound_loader_resolves_included_schemas() {
        let loader = Arc::new(MemoryLoader::new().with("item.xsd", ITEM_TYPE_SCHEMA));
        let validator = XmlSchemaValidator::new().with_resource_loader(loader);
        let mut violations = Violations::new();
        validator.validate("<item>ok</item>", INCLUDING_SCHEMA, &mut violations);
        assert!(violations.is_empty());
    }

    #[test]
    fn unbound_validator_reports_unresolved_include_as_one_violation() {
        let violations = validate(&XmlSchemaValidator::new(), "<item>ok</item>", INCLUDING_SCHEMA);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn missing_referenced_schema_yields_one_violation() {
        let loader = Arc::new(MemoryLoader::new());
        let validator = XmlSchemaValidator::new().with_resource_loader(loader);
        let mut violations = Violations::new();
        validator.validate("<item>ok</item>", INCLUDING_SCHEMA, &mut violations);
        assert_eq!(violations.len(), 1);
        assert!(violations
            .iter()
            .next()
            .unwrap()
            .message
            .contains("not found"));
    }

    #[test]
    fn external_references_are_scanned_from_all_reference_kinds() {
        let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:import namespace="urn:a" schemaLocation="a.xsd"/>
  <xs:include schemaLocation="b.xsd"/>
  <xs:redefine schemaLocation="c.xsd"></xs:redefine>
</xs:schema>"#;
        let mut locations = external_references(schema);
        locations.sort();
        assert_eq!(locations, vec!["a.xsd", "b.xsd", "c.xsd"]);
    }

    #[test]
    fn escaping_locations_are_not_staged() {
        assert!(relative_path("../etc/passwd").is_none());
        assert!(relative_path("/etc/passwd").is_none());
        assert_eq!(
            relative_path("types/item.xsd"),
            Some(PathBuf::from("types/item.xsd"))
        );
    }
}
