// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compliance-document parser
//!
//! Converts declarative XML source into the [`IdsDocument`] model. All
//! format-specific structural decisions live here: default occurrence
//! bounds, the facet node shapes, and the empty-applicability rejection.
//! Element names are matched on their local part, so namespace prefixes
//! do not matter.

use crate::{
    Facet, IdsDocument, MaxOccurs, Requirement, Restriction, Result, SpecError, Specification,
    ValueConstraint,
};
use roxmltree::Node;

/// Parse a compliance document from XML source
///
/// Fails when the source is not well-formed or lacks the mandatory `info` /
/// `specifications` sections. Specifications with an empty applicability
/// list are dropped: a rule that applies to nothing is not meaningful and
/// would otherwise silently match the entire model under a vacuous
/// intersection.
pub fn parse(source: &str) -> Result<IdsDocument> {
    let xml = roxmltree::Document::parse(source)?;
    let root = xml.root_element();

    let info = named_child(root, "info").ok_or(SpecError::MissingSection("info"))?;
    let specifications_root =
        named_child(root, "specifications").ok_or(SpecError::MissingSection("specifications"))?;

    let mut document = IdsDocument {
        title: child_text(info, "title").unwrap_or_default(),
        version: child_text(info, "version"),
        author: child_text(info, "author"),
        date: child_text(info, "date"),
        purpose: child_text(info, "purpose"),
        specifications: Vec::new(),
    };

    for node in element_children(specifications_root) {
        if node.tag_name().name() != "specification" {
            continue;
        }
        if let Some(specification) = parse_specification(node)? {
            document.specifications.push(specification);
        }
    }

    Ok(document)
}

/// Parse one specification node; `None` when its applicability is empty
fn parse_specification(node: Node) -> Result<Option<Specification>> {
    let name = node
        .attribute("name")
        .map(str::to_string)
        .unwrap_or_else(|| "Unnamed Specification".to_string());

    let ifc_versions = node
        .attribute("ifcVersion")
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    let applicability = match named_child(node, "applicability") {
        Some(section) => parse_facets(section)?,
        None => Vec::new(),
    };
    if applicability.is_empty() {
        return Ok(None);
    }

    let requirements = match named_child(node, "requirements") {
        Some(section) => parse_requirements(section)?,
        None => Vec::new(),
    };

    Ok(Some(Specification {
        name,
        description: node.attribute("description").map(str::to_string),
        instructions: node.attribute("instructions").map(str::to_string),
        ifc_versions,
        applicability,
        requirements,
    }))
}

/// Decode a facet list; the same decoder serves both sections
fn parse_facets(section: Node) -> Result<Vec<Facet>> {
    let mut facets = Vec::new();
    for node in element_children(section) {
        if let Some(facet) = parse_facet(node)? {
            facets.push(facet);
        }
    }
    Ok(facets)
}

fn parse_requirements(section: Node) -> Result<Vec<Requirement>> {
    let mut requirements = Vec::new();
    for node in element_children(section) {
        let Some(facet) = parse_facet(node)? else {
            continue;
        };
        let min_occurs = node
            .attribute("minOccurs")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        let max_occurs = match node.attribute("maxOccurs") {
            Some("unbounded") | None => MaxOccurs::Unbounded,
            Some(v) => v.parse().map(MaxOccurs::Bounded).unwrap_or_default(),
        };
        requirements.push(Requirement {
            facet,
            min_occurs,
            max_occurs,
            instructions: node.attribute("instructions").map(str::to_string),
        });
    }
    Ok(requirements)
}

/// Decode one facet node; unknown shapes and shapes missing their selector
/// fields are skipped
fn parse_facet(node: Node) -> Result<Option<Facet>> {
    let facet = match node.tag_name().name() {
        "entity" => {
            let Some(name) = parse_value(named_child(node, "name"))? else {
                return Ok(None);
            };
            Some(Facet::Entity {
                name,
                predefined_type: parse_value(named_child(node, "predefinedType"))?,
            })
        }
        "classification" => Some(Facet::Classification {
            system: parse_value(named_child(node, "system"))?,
            value: parse_value(named_child(node, "value"))?,
        }),
        "attribute" => {
            let Some(name) = parse_value(named_child(node, "name"))? else {
                return Ok(None);
            };
            Some(Facet::Attribute {
                name,
                value: parse_value(named_child(node, "value"))?,
            })
        }
        "property" => {
            let Some(property_set) = parse_value(named_child(node, "propertySet"))? else {
                return Ok(None);
            };
            let Some(base_name) = parse_value(named_child(node, "baseName"))? else {
                return Ok(None);
            };
            Some(Facet::Property {
                property_set,
                base_name,
                value: parse_value(named_child(node, "value"))?,
                data_type: node.attribute("dataType").map(str::to_string),
            })
        }
        "material" => Some(Facet::Material {
            value: parse_value(named_child(node, "value"))?,
        }),
        "partOf" => {
            // The governing entity is a nested entity facet
            let entity = match named_child(node, "entity") {
                Some(entity_node) => parse_value(named_child(entity_node, "name"))?,
                None => None,
            };
            let Some(entity) = entity else {
                return Ok(None);
            };
            Some(Facet::PartOf {
                entity,
                relation: node.attribute("relation").map(str::to_string),
            })
        }
        _ => None,
    };
    Ok(facet)
}

/// Decode a facet field into a value constraint
///
/// A `simpleValue` child yields a literal; a `restriction` child yields a
/// restriction collecting whichever clauses are present; otherwise trimmed
/// direct text content falls back to a literal; otherwise the field is
/// undefined ("any").
fn parse_value(node: Option<Node>) -> Result<Option<ValueConstraint>> {
    let Some(node) = node else {
        return Ok(None);
    };

    if let Some(simple) = named_child(node, "simpleValue") {
        let text = simple.text().unwrap_or_default().trim().to_string();
        return Ok(Some(ValueConstraint::Literal(text)));
    }

    if let Some(restriction_node) = named_child(node, "restriction") {
        return Ok(Some(ValueConstraint::Restriction(parse_restriction(
            restriction_node,
        )?)));
    }

    if let Some(text) = node.text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Ok(Some(ValueConstraint::Literal(trimmed.to_string())));
        }
    }

    Ok(None)
}

fn parse_restriction(node: Node) -> Result<Restriction> {
    let mut restriction = Restriction::default();
    let mut enumeration: Vec<String> = Vec::new();

    for clause in element_children(node) {
        let value = clause.attribute("value").unwrap_or_default();
        match clause.tag_name().name() {
            "pattern" => {
                restriction
                    .set_pattern(value)
                    .map_err(|source| SpecError::Pattern {
                        pattern: value.to_string(),
                        source,
                    })?;
            }
            "enumeration" => enumeration.push(value.to_string()),
            "minLength" => restriction.min_length = value.parse().ok(),
            "maxLength" => restriction.max_length = value.parse().ok(),
            "minInclusive" => restriction.min_inclusive = value.parse().ok(),
            "maxInclusive" => restriction.max_inclusive = value.parse().ok(),
            _ => {}
        }
    }

    if !enumeration.is_empty() {
        restriction.enumeration = Some(enumeration);
    }
    Ok(restriction)
}

fn named_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn child_text(node: Node, name: &str) -> Option<String> {
    named_child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <ids xmlns="http://standards.buildingsmart.org/IDS"
             xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <info>
            <title>Wall checks</title>
            <version>1.0</version>
            <author>qa@example.com</author>
          </info>
          <specifications>
            <specification name="Load bearing walls" ifcVersion="IFC4 IFC4X3">
              <applicability>
                <entity>
                  <name><simpleValue>IFCWALL</simpleValue></name>
                </entity>
              </applicability>
              <requirements>
                <property dataType="IFCBOOLEAN">
                  <propertySet><simpleValue>Pset_WallCommon</simpleValue></propertySet>
                  <baseName><simpleValue>LoadBearing</simpleValue></baseName>
                  <value><simpleValue>true</simpleValue></value>
                </property>
                <classification minOccurs="0">
                  <system><simpleValue>Uniclass</simpleValue></system>
                </classification>
              </requirements>
            </specification>
          </specifications>
        </ids>"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.title, "Wall checks");
        assert_eq!(doc.version.as_deref(), Some("1.0"));
        assert_eq!(doc.specifications.len(), 1);

        let spec = &doc.specifications[0];
        assert_eq!(spec.name, "Load bearing walls");
        assert_eq!(spec.ifc_versions, vec!["IFC4", "IFC4X3"]);
        assert_eq!(spec.applicability.len(), 1);
        assert_eq!(spec.requirements.len(), 2);

        let Facet::Property {
            property_set,
            base_name,
            value,
            data_type,
        } = &spec.requirements[0].facet
        else {
            panic!("expected property facet");
        };
        assert_eq!(
            property_set,
            &ValueConstraint::Literal("Pset_WallCommon".into())
        );
        assert_eq!(base_name, &ValueConstraint::Literal("LoadBearing".into()));
        assert_eq!(value.as_ref().unwrap(), &ValueConstraint::Literal("true".into()));
        assert_eq!(data_type.as_deref(), Some("IFCBOOLEAN"));

        // Default and explicit occurrence bounds
        assert_eq!(spec.requirements[0].min_occurs, 1);
        assert_eq!(spec.requirements[0].max_occurs, MaxOccurs::Unbounded);
        assert!(spec.requirements[1].is_optional());
    }

    #[test]
    fn test_empty_applicability_is_dropped() {
        let source = r#"
            <ids>
              <info><title>T</title></info>
              <specifications>
                <specification name="applies to nothing">
                  <applicability/>
                  <requirements>
                    <material/>
                  </requirements>
                </specification>
              </specifications>
            </ids>"#;
        let doc = parse(source).unwrap();
        assert!(doc.specifications.is_empty());
    }

    #[test]
    fn test_missing_specifications_section_fails() {
        let source = r#"<ids><info><title>T</title></info></ids>"#;
        let err = parse(source).unwrap_err();
        assert!(matches!(err, SpecError::MissingSection("specifications")));
    }

    #[test]
    fn test_missing_info_section_fails() {
        let source = r#"<ids><specifications/></ids>"#;
        let err = parse(source).unwrap_err();
        assert!(matches!(err, SpecError::MissingSection("info")));
    }

    #[test]
    fn test_malformed_markup_fails() {
        assert!(matches!(
            parse("<ids><info>").unwrap_err(),
            SpecError::Format(_)
        ));
    }

    #[test]
    fn test_restriction_parsing() {
        let source = r#"
            <ids>
              <info><title>T</title></info>
              <specifications>
                <specification name="typed walls">
                  <applicability>
                    <entity>
                      <name>
                        <xs:restriction xmlns:xs="http://www.w3.org/2001/XMLSchema">
                          <xs:enumeration value="IFCWALL"/>
                          <xs:enumeration value="IFCSLAB"/>
                        </xs:restriction>
                      </name>
                    </entity>
                    <attribute>
                      <name><simpleValue>Name</simpleValue></name>
                      <value>
                        <xs:restriction xmlns:xs="http://www.w3.org/2001/XMLSchema">
                          <xs:pattern value="W-[0-9]+"/>
                        </xs:restriction>
                      </value>
                    </attribute>
                  </applicability>
                </specification>
              </specifications>
            </ids>"#;
        let doc = parse(source).unwrap();
        let spec = &doc.specifications[0];

        let Facet::Entity { name, .. } = &spec.applicability[0] else {
            panic!("expected entity facet");
        };
        assert!(name.matches(Some("IfcSlab")));
        assert!(!name.matches(Some("IfcDoor")));

        let Facet::Attribute { value, .. } = &spec.applicability[1] else {
            panic!("expected attribute facet");
        };
        assert!(value.as_ref().unwrap().matches(Some("W-042")));
        assert!(!value.as_ref().unwrap().matches(Some("W-")));
    }

    #[test]
    fn test_invalid_pattern_is_a_parse_error() {
        let source = r#"
            <ids>
              <info><title>T</title></info>
              <specifications>
                <specification>
                  <applicability>
                    <attribute>
                      <name><simpleValue>Name</simpleValue></name>
                      <value><restriction><pattern value="("/></restriction></value>
                    </attribute>
                  </applicability>
                </specification>
              </specifications>
            </ids>"#;
        assert!(matches!(
            parse(source).unwrap_err(),
            SpecError::Pattern { .. }
        ));
    }

    #[test]
    fn test_text_fallback_and_unnamed_default() {
        let source = r#"
            <ids>
              <info><title>T</title></info>
              <specifications>
                <specification>
                  <applicability>
                    <entity><name>IFCDOOR</name></entity>
                  </applicability>
                </specification>
              </specifications>
            </ids>"#;
        let doc = parse(source).unwrap();
        let spec = &doc.specifications[0];
        assert_eq!(spec.name, "Unnamed Specification");
        assert_eq!(
            spec.applicability[0],
            Facet::Entity {
                name: ValueConstraint::Literal("IFCDOOR".into()),
                predefined_type: None,
            }
        );
    }

    #[test]
    fn test_part_of_facet() {
        let source = r#"
            <ids>
              <info><title>T</title></info>
              <specifications>
                <specification>
                  <applicability>
                    <partOf relation="IFCRELAGGREGATES">
                      <entity><name><simpleValue>IFCROOF</simpleValue></name></entity>
                    </partOf>
                  </applicability>
                </specification>
              </specifications>
            </ids>"#;
        let doc = parse(source).unwrap();
        assert_eq!(
            doc.specifications[0].applicability[0],
            Facet::PartOf {
                entity: ValueConstraint::Literal("IFCROOF".into()),
                relation: Some("IFCRELAGGREGATES".into()),
            }
        );
    }
}
