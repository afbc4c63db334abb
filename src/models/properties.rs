use indexmap::IndexMap;
use tracing::trace;

use crate::dom::Element;

/// Plugin configuration: ordered key/value pairs from a `<configuration>`
/// block.
pub type Config = IndexMap<String, String>;

/// Collects every `<property>` below `element` that has both a non-empty
/// `<key>` and `<value>`. Incomplete properties are skipped.
///
/// Returns `None` when nothing usable was found, which is not the same thing
/// as an explicitly empty configuration.
pub fn fetch_properties_from(element: &Element) -> Option<Config> {
    let mut config = Config::new();
    for property in element.descendants("property") {
        let key = property.find("key").and_then(Element::text);
        let value = property.find("value").and_then(Element::text);
        match (key, value) {
            (Some(key), Some(value)) => {
                config.insert(key, value);
            }
            _ => trace!(property = %property, "skipping incomplete property"),
        }
    }
    (!config.is_empty()).then_some(config)
}

pub(crate) fn configuration_element(config: &Config) -> Element {
    config
        .iter()
        .fold(Element::new("configuration"), |configuration, (key, value)| {
            configuration.with_child(
                Element::new("property")
                    .with_child(Element::new("key").with_text(key))
                    .with_child(Element::new("value").with_text(value)),
            )
        })
}
