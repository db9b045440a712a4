//! Locate property values and package versions in MSBuild XML.
//!
//! The file is streamed once with a namespace-aware reader. Elements count
//! only when they sit in the root element's default namespace (the legacy
//! `http://schemas.microsoft.com/developer/msbuild/2003` one, or none at all
//! for SDK-style projects). Every located value carries the byte range of its
//! raw text so it can be spliced without re-serializing the document.

use std::ops::Range;
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use regex::Regex;

use super::DocumentError;

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[A-Za-z_][\w.:-]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("attribute regex is valid")
});

/// A raw value and its decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlValue {
    pub range: Range<usize>,
    pub value: String,
}

/// A `<PropertyGroup>` child with plain text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: XmlValue,
}

/// A `PackageReference` or `PackageVersion` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub element: String,
    pub id: String,
    /// From the `Version` attribute or a `<Version>` child element.
    pub version: Option<XmlValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsBuildDocument {
    pub root: String,
    pub properties: Vec<Property>,
    pub packages: Vec<PackageItem>,
}

/// Owned copy of a resolved element namespace.
enum Namespace {
    Bound(Vec<u8>),
    Unbound,
    Unknown,
}

impl From<ResolveResult<'_>> for Namespace {
    fn from(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(ns) => Self::Bound(ns.as_ref().to_vec()),
            ResolveResult::Unbound => Self::Unbound,
            ResolveResult::Unknown(_) => Self::Unknown,
        }
    }
}

struct Frame {
    name: String,
    in_scope: bool,
}

enum Capture {
    Property(String),
    PackageVersion(usize),
}

struct PendingText {
    depth: usize,
    target: Capture,
    text: Option<XmlValue>,
    mixed: bool,
}

/// Stream `source` and collect the values the project upgraders care about.
///
/// Returns an error for anything that is not well-formed XML.
pub fn scan(source: &str) -> Result<MsBuildDocument, DocumentError> {
    let mut reader = NsReader::from_str(source);
    let mut doc = MsBuildDocument::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root_ns: Option<Option<Vec<u8>>> = None;
    let mut pending: Option<PendingText> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let (resolved, event) = match reader.read_resolved_event() {
            Ok((resolved, event)) => (Namespace::from(resolved), event),
            Err(e) => {
                return Err(DocumentError::Xml {
                    position: before as u64,
                    message: e.to_string(),
                })
            }
        };
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let root = root_ns.get_or_insert_with(|| {
                    doc.root = name.clone();
                    match &resolved {
                        Namespace::Bound(ns) => Some(ns.clone()),
                        _ => None,
                    }
                });
                let in_scope = match &resolved {
                    Namespace::Unbound => true,
                    Namespace::Bound(ns) => root.as_ref() == Some(ns),
                    Namespace::Unknown => false,
                };

                if let Some(p) = pending.as_mut() {
                    p.mixed = true;
                }

                // Raw tag content sits just before `>` or `/>`.
                let content_end = after - 1 - usize::from(is_empty);
                let content_start = content_end.saturating_sub(e.len());
                let tag = &source[content_start..content_end];

                let parent = stack.last().filter(|f| f.in_scope).map(|f| f.name.as_str());
                let depth = stack.len() + 1;
                if in_scope {
                    match (parent, name.as_str()) {
                        (Some("PropertyGroup"), _) if !is_empty => {
                            pending = Some(PendingText {
                                depth,
                                target: Capture::Property(name.clone()),
                                text: None,
                                mixed: false,
                            });
                        }
                        (Some("ItemGroup"), "PackageReference" | "PackageVersion") => {
                            let attrs = attributes(tag, content_start);
                            let find = |key: &str| {
                                attrs
                                    .iter()
                                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                                    .map(|(_, v)| v.clone())
                            };
                            if let Some(id) = find("Include").or_else(|| find("Update")) {
                                doc.packages.push(PackageItem {
                                    element: name.clone(),
                                    id: id.value,
                                    version: find("Version"),
                                });
                            }
                        }
                        (Some("PackageReference" | "PackageVersion"), "Version") if !is_empty => {
                            if let Some(index) = doc.packages.len().checked_sub(1) {
                                if doc.packages[index].version.is_none() {
                                    pending = Some(PendingText {
                                        depth,
                                        target: Capture::PackageVersion(index),
                                        text: None,
                                        mixed: false,
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }

                if !is_empty {
                    stack.push(Frame { name, in_scope });
                }
            }
            Event::Text(ref t) => {
                if let Some(p) = pending.as_mut().filter(|p| p.depth == stack.len()) {
                    let raw = &source[before..before + t.len()];
                    let value = quick_xml::escape::unescape(raw)
                        .map_err(|e| DocumentError::Xml {
                            position: before as u64,
                            message: e.to_string(),
                        })?
                        .into_owned();
                    if p.text.is_some() {
                        p.mixed = true;
                    } else {
                        p.text = Some(XmlValue {
                            range: before..before + t.len(),
                            value,
                        });
                    }
                }
            }
            Event::CData(_) | Event::Comment(_) | Event::PI(_) => {
                if let Some(p) = pending.as_mut() {
                    p.mixed = true;
                }
            }
            Event::End(_) => {
                if stack.pop().is_none() {
                    return Err(DocumentError::Xml {
                        position: before as u64,
                        message: "unexpected closing tag".into(),
                    });
                }
                if pending.as_ref().is_some_and(|p| p.depth == stack.len() + 1) {
                    if let Some(PendingText {
                        target,
                        text: Some(value),
                        mixed: false,
                        ..
                    }) = pending.take()
                    {
                        match target {
                            Capture::Property(name) => doc.properties.push(Property { name, value }),
                            Capture::PackageVersion(index) => doc.packages[index].version = Some(value),
                        }
                    }
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(DocumentError::Xml {
            position: source.len() as u64,
            message: format!("unclosed element <{}>", stack.last().map_or("", |f| f.name.as_str())),
        });
    }
    if root_ns.is_none() {
        return Err(DocumentError::Xml {
            position: 0,
            message: "no root element".into(),
        });
    }
    Ok(doc)
}

fn attributes(tag: &str, offset: usize) -> Vec<(String, XmlValue)> {
    ATTRIBUTE
        .captures_iter(tag)
        .filter_map(|caps| {
            let value = caps.name("dq").or_else(|| caps.name("sq"))?;
            let decoded = quick_xml::escape::unescape(value.as_str()).ok()?.into_owned();
            Some((
                caps["name"].to_string(),
                XmlValue {
                    range: offset + value.start()..offset + value.end(),
                    value: decoded,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_properties_in_sdk_projects() {
        let source = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net6.0</TargetFramework>
    <Nullable>enable</Nullable>
  </PropertyGroup>
</Project>"#;
        let doc = scan(source).unwrap();
        let tfm = doc.properties.iter().find(|p| p.name == "TargetFramework").unwrap();
        assert_eq!(tfm.value.value, "net6.0");
        assert_eq!(&source[tfm.value.range.clone()], "net6.0");
    }

    #[test]
    fn honours_the_root_namespace() {
        let source = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup><TargetFramework>netcoreapp3.1</TargetFramework></PropertyGroup>
  <x:PropertyGroup xmlns:x="urn:other"><x:TargetFramework>net5.0</x:TargetFramework></x:PropertyGroup>
</Project>"#;
        let doc = scan(source).unwrap();
        let values: Vec<_> = doc.properties.iter().map(|p| p.value.value.as_str()).collect();
        assert_eq!(values, vec!["netcoreapp3.1"]);
    }

    #[test]
    fn finds_package_versions() {
        let source = r#"<Project>
  <ItemGroup>
    <PackageReference Include="Microsoft.Extensions.Http" Version="6.0.0" />
    <PackageReference Include="Polly">
      <Version>7.2.4</Version>
    </PackageReference>
    <PackageVersion Update='System.Text.Json' Version='6.0.1'/>
  </ItemGroup>
</Project>"#;
        let doc = scan(source).unwrap();
        let found: Vec<_> = doc
            .packages
            .iter()
            .map(|p| (p.id.as_str(), p.version.as_ref().map(|v| &source[v.range.clone()])))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Microsoft.Extensions.Http", Some("6.0.0")),
                ("Polly", Some("7.2.4")),
                ("System.Text.Json", Some("6.0.1")),
            ]
        );
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(scan("<Project><PropertyGroup></Project>").is_err());
        assert!(scan("<Project>").is_err());
        assert!(scan("").is_err());
    }
}
