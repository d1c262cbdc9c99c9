//! The closed set of tag classes.
//!
//! Each class has a fourcc (stored big-endian ASCII, e.g. `scnr`), a file
//! extension, and an optional parent class. The parent chain supplies the
//! secondary and tertiary classes of a tag array entry.

use std::fmt;

/// Fourcc written when a class slot is empty.
pub const NO_CLASS: u32 = 0xFFFF_FFFF;

macro_rules! tag_classes {
    ($($variant:ident => $fourcc:literal, $extension:literal;)*) => {
        /// A tag class.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TagClass {
            $($variant,)*
        }

        impl TagClass {
            /// Every class, in declaration order.
            pub const ALL: &'static [TagClass] = &[$(TagClass::$variant,)*];

            /// Four-character code, packed big-endian.
            pub fn fourcc(self) -> u32 {
                match self {
                    $(TagClass::$variant => u32::from_be_bytes(*$fourcc),)*
                }
            }

            /// File extension used by tag sources (`scenario`, `bitmap`, ...).
            pub fn extension(self) -> &'static str {
                match self {
                    $(TagClass::$variant => $extension,)*
                }
            }
        }
    };
}

tag_classes! {
    Actor => b"actr", "actor";
    ActorVariant => b"actv", "actor_variant";
    Antenna => b"ant!", "antenna";
    Biped => b"bipd", "biped";
    Bitmap => b"bitm", "bitmap";
    CameraTrack => b"trak", "camera_track";
    ColorTable => b"colo", "color_table";
    ContinuousDamageEffect => b"cdmg", "continuous_damage_effect";
    Contrail => b"cont", "contrail";
    DamageEffect => b"jpt!", "damage_effect";
    Decal => b"deca", "decal";
    DetailObjectCollection => b"dobc", "detail_object_collection";
    Device => b"devi", "device";
    DeviceControl => b"ctrl", "device_control";
    DeviceLightFixture => b"lifi", "device_light_fixture";
    DeviceMachine => b"mach", "device_machine";
    Dialogue => b"udlg", "dialogue";
    Effect => b"effe", "effect";
    Equipment => b"eqip", "equipment";
    Flag => b"flag", "flag";
    Fog => b"fog ", "fog";
    Font => b"font", "font";
    Garbage => b"garb", "garbage";
    Gbxmodel => b"mod2", "gbxmodel";
    Globals => b"matg", "globals";
    Glow => b"glw!", "glow";
    GrenadeHudInterface => b"grhi", "grenade_hud_interface";
    HudGlobals => b"hudg", "hud_globals";
    HudMessageText => b"hmt ", "hud_message_text";
    HudNumber => b"hud#", "hud_number";
    Item => b"item", "item";
    ItemCollection => b"itmc", "item_collection";
    LensFlare => b"lens", "lens_flare";
    Light => b"ligh", "light";
    LightVolume => b"mgs2", "light_volume";
    Lightning => b"elec", "lightning";
    MaterialEffects => b"foot", "material_effects";
    Meter => b"metr", "meter";
    Model => b"mode", "model";
    ModelAnimations => b"antr", "model_animations";
    ModelCollisionGeometry => b"coll", "model_collision_geometry";
    MultiplayerScenarioDescription => b"mply", "multiplayer_scenario_description";
    Object => b"obje", "object";
    Particle => b"part", "particle";
    ParticleSystem => b"pctl", "particle_system";
    Physics => b"phys", "physics";
    Placeholder => b"plac", "placeholder";
    PointPhysics => b"pphy", "point_physics";
    Projectile => b"proj", "projectile";
    Scenario => b"scnr", "scenario";
    ScenarioStructureBsp => b"sbsp", "scenario_structure_bsp";
    Scenery => b"scen", "scenery";
    Shader => b"shdr", "shader";
    ShaderEnvironment => b"senv", "shader_environment";
    ShaderModel => b"soso", "shader_model";
    ShaderTransparentChicago => b"schi", "shader_transparent_chicago";
    ShaderTransparentChicagoExtended => b"scex", "shader_transparent_chicago_extended";
    ShaderTransparentGeneric => b"sotr", "shader_transparent_generic";
    ShaderTransparentGlass => b"sgla", "shader_transparent_glass";
    ShaderTransparentMeter => b"smet", "shader_transparent_meter";
    ShaderTransparentPlasma => b"spla", "shader_transparent_plasma";
    ShaderTransparentWater => b"swat", "shader_transparent_water";
    Sky => b"sky ", "sky";
    Sound => b"snd!", "sound";
    SoundEnvironment => b"snde", "sound_environment";
    SoundLooping => b"lsnd", "sound_looping";
    SoundScenery => b"ssce", "sound_scenery";
    StringList => b"str#", "string_list";
    TagCollection => b"tagc", "tag_collection";
    UiWidgetCollection => b"Soul", "ui_widget_collection";
    UiWidgetDefinition => b"DeLa", "ui_widget_definition";
    UnicodeStringList => b"ustr", "unicode_string_list";
    Unit => b"unit", "unit";
    UnitHudInterface => b"unhi", "unit_hud_interface";
    Vehicle => b"vehi", "vehicle";
    VirtualKeyboard => b"vcky", "virtual_keyboard";
    Weapon => b"weap", "weapon";
    WeaponHudInterface => b"wphi", "weapon_hud_interface";
    WeatherParticleSystem => b"rain", "weather_particle_system";
    Wind => b"wind", "wind";
}

impl TagClass {
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.fourcc() == fourcc)
    }

    /// Parse an extension, ignoring ASCII case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.extension().eq_ignore_ascii_case(extension))
    }

    /// The class this one inherits from in the engine's object hierarchy.
    pub fn parent(self) -> Option<Self> {
        use TagClass::*;
        match self {
            ShaderEnvironment
            | ShaderModel
            | ShaderTransparentChicago
            | ShaderTransparentChicagoExtended
            | ShaderTransparentGeneric
            | ShaderTransparentGlass
            | ShaderTransparentMeter
            | ShaderTransparentPlasma
            | ShaderTransparentWater => Some(Shader),
            Scenery | Placeholder | SoundScenery | Projectile => Some(Object),
            Biped | Vehicle => Some(Unit),
            Weapon | Equipment | Garbage => Some(Item),
            DeviceMachine | DeviceControl | DeviceLightFixture => Some(Device),
            Unit | Item | Device => Some(Object),
            _ => None,
        }
    }

    /// Fourcc of the parent class, or [`NO_CLASS`].
    pub fn secondary_fourcc(self) -> u32 {
        self.parent().map_or(NO_CLASS, TagClass::fourcc)
    }

    /// Fourcc of the grandparent class, or [`NO_CLASS`].
    pub fn tertiary_fourcc(self) -> u32 {
        self.parent()
            .and_then(TagClass::parent)
            .map_or(NO_CLASS, TagClass::fourcc)
    }

    /// Classes the linker stores under another class.
    pub fn normalize(self) -> Self {
        match self {
            TagClass::Model => TagClass::Gbxmodel,
            other => other,
        }
    }

    /// Printable fourcc (`snd!`, `fog `).
    pub fn fourcc_str(self) -> String {
        fourcc_to_string(self.fourcc())
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render a packed fourcc, replacing non-printable bytes with `?`.
pub fn fourcc_to_string(fourcc: u32) -> String {
    fourcc
        .to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}
