use std::sync::OnceLock;

use egui::Vec2;

/// Queries used to detect what the host platform can do.
pub trait CapabilityProbe {
    /// Elements expose a `draggable` property.
    fn has_element_property(&self, name: &str) -> bool;

    /// Elements expose an `on<event>` handler slot, e.g. `"ondragstart"`.
    fn has_handler_slot(&self, name: &str) -> bool;

    /// The handler slot exists and holds an object (as opposed to `undefined`).
    fn handler_slot_is_object(&self, name: &str) -> bool;

    /// The root element's style declaration supports `property`.
    fn supports_style_property(&self, property: &str) -> bool;
}

/// Transform property names, in order of preference.
pub const TRANSFORM_PROPERTIES: [&str; 5] = [
    "transform",
    "-webkit-transform",
    "-o-transform",
    "-ms-transform",
    "-moz-transform",
];

/// The style property used for transform-based rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformProperty(pub &'static str);

impl TransformProperty {
    /// One of [`TRANSFORM_PROPERTIES`].
    pub fn from_name(name: &str) -> Option<Self> {
        TRANSFORM_PROPERTIES
            .iter()
            .copied()
            .find(|known| *known == name)
            .map(Self)
    }

    pub fn name(self) -> &'static str {
        self.0
    }

    /// The visual offset value for `delta`, e.g. `translate(10px, 5px)`.
    pub fn offset(self, delta: Vec2) -> String {
        format!("translate({}px, {}px)", delta.x, delta.y)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TransformProperty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TransformProperty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).ok_or_else(|| {
            serde::de::Error::unknown_variant(&name, &TRANSFORM_PROPERTIES)
        })
    }
}

/// What the platform supports. Absence of a capability is a normal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    pub native_drag_and_drop: bool,

    /// `None` means layout-based rendering only.
    pub transform: Option<TransformProperty>,
}

impl Capabilities {
    pub fn detect(probe: &(impl CapabilityProbe + ?Sized)) -> Self {
        let native_drag_and_drop = probe.has_element_property("draggable")
            && probe.has_handler_slot("ondragstart")
            && probe.handler_slot_is_object("ondrop");

        let transform = TRANSFORM_PROPERTIES
            .iter()
            .copied()
            .find(|property| probe.supports_style_property(property))
            .map(TransformProperty);

        let caps = Self {
            native_drag_and_drop,
            transform,
        };
        log::debug!("detected capabilities: {caps:?}");
        caps
    }

    /// [`Self::detect`] once per process; later calls return the first result.
    pub fn detect_once(probe: &(impl CapabilityProbe + ?Sized)) -> Self {
        static DETECTED: OnceLock<Capabilities> = OnceLock::new();
        *DETECTED.get_or_init(|| Self::detect(probe))
    }

    /// Pointer-driven dragging rendered with `transform`.
    pub fn manual() -> Self {
        Self {
            native_drag_and_drop: false,
            transform: Some(TransformProperty("transform")),
        }
    }

    /// Pointer-driven dragging rendered through `left`/`top` only.
    pub fn manual_layout_only() -> Self {
        Self {
            native_drag_and_drop: false,
            transform: None,
        }
    }

    /// Platform drag-and-drop.
    pub fn native() -> Self {
        Self {
            native_drag_and_drop: true,
            transform: Some(TransformProperty("transform")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        dnd: bool,
        drop_is_object: bool,
        styles: &'static [&'static str],
    }

    impl CapabilityProbe for Probe {
        fn has_element_property(&self, name: &str) -> bool {
            self.dnd && name == "draggable"
        }

        fn has_handler_slot(&self, name: &str) -> bool {
            self.dnd && name.starts_with("on")
        }

        fn handler_slot_is_object(&self, _name: &str) -> bool {
            self.drop_is_object
        }

        fn supports_style_property(&self, property: &str) -> bool {
            self.styles.contains(&property)
        }
    }

    #[test]
    fn prefers_unprefixed_transform() {
        let caps = Capabilities::detect(&Probe {
            dnd: true,
            drop_is_object: true,
            styles: &["-moz-transform", "transform"],
        });
        assert!(caps.native_drag_and_drop);
        assert_eq!(caps.transform, Some(TransformProperty("transform")));
    }

    #[test]
    fn falls_back_to_vendor_prefix_in_order() {
        let caps = Capabilities::detect(&Probe {
            dnd: false,
            drop_is_object: false,
            styles: &["-moz-transform", "-ms-transform"],
        });
        assert!(!caps.native_drag_and_drop);
        assert_eq!(caps.transform, Some(TransformProperty("-ms-transform")));
    }

    #[test]
    fn drop_slot_must_be_an_object() {
        let caps = Capabilities::detect(&Probe {
            dnd: true,
            drop_is_object: false,
            styles: &[],
        });
        assert!(!caps.native_drag_and_drop);
        assert_eq!(caps.transform, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn capabilities_deserialize_from_json() {
        let caps: Capabilities = serde_json::from_str(
            r#"{"native_drag_and_drop":false,"transform":"-webkit-transform"}"#,
        )
        .unwrap();
        assert_eq!(caps.transform, Some(TransformProperty("-webkit-transform")));

        let err = serde_json::from_str::<Capabilities>(
            r#"{"native_drag_and_drop":false,"transform":"rotate"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn translate_value() {
        let t = TransformProperty("transform");
        assert_eq!(t.offset(Vec2::new(10.0, -5.5)), "translate(10px, -5.5px)");
    }

    #[test]
    fn detection_is_cached_for_the_process() {
        let first = Capabilities::detect_once(&Probe {
            dnd: true,
            drop_is_object: true,
            styles: &["transform"],
        });
        assert_eq!(first, Capabilities::native());

        let second = Capabilities::detect_once(&Probe {
            dnd: false,
            drop_is_object: false,
            styles: &[],
        });
        assert_eq!(second, first);
        assert_ne!(second, Capabilities::manual_layout_only());
    }
}
