//! Tag value tables. Every lookup is total: anything unrecognised is `Unknown`.

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $tag:literal $(| $alias:literal)*,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[archive(check_bytes)]
        pub enum $name {
            Unknown,
            $($variant,)*
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unknown
            }
        }

        impl $name {
            /// Canonical tag values, one per known variant.
            pub const KNOWN: &'static [&'static str] = &[$($tag,)*];

            pub fn from_tag(value: &str) -> Self {
                match value {
                    $($tag $(| $alias)* => $name::$variant,)*
                    _ => $name::Unknown,
                }
            }

            pub fn as_tag(&self) -> Option<&'static str> {
                match self {
                    $name::Unknown => None,
                    $($name::$variant => Some($tag),)*
                }
            }

            pub fn is_known(&self) -> bool {
                *self != $name::Unknown
            }
        }
    };
}

tag_enum! {
    /// `highway=*`
    PathType {
        Motorway => "motorway",
        Trunk => "trunk",
        Primary => "primary",
        Secondary => "secondary",
        Tertiary => "tertiary",
        Unclassified => "unclassified",
        Residential => "residential",
        Service => "service",
        LivingStreet => "living_street",
        Pedestrian => "pedestrian",
        Footway => "footway",
        Cycleway => "cycleway",
        Path => "path",
        Track => "track",
        Bridleway => "bridleway",
        Steps => "steps",
        Road => "road",
    }
}

tag_enum! {
    /// `surface=*`
    PathSurfaceMaterial {
        Asphalt => "asphalt",
        Concrete => "concrete",
        Paved => "paved",
        Unpaved => "unpaved",
        Gravel => "gravel",
        Dirt => "dirt",
        Sand => "sand",
        Grass => "grass",
        Mud => "mud",
        Cobblestone => "cobblestone",
        Pebblestone => "pebblestone",
        Sett => "sett",
        Wood => "wood",
        Metal => "metal",
        Snow => "snow",
        Ice => "ice",
        Compacted => "compacted",
        FineGravel => "fine_gravel",
        Ground => "ground" | "earth",
    }
}

tag_enum! {
    /// `landuse=*`
    LanduseKind {
        Residential => "residential",
        Commercial => "commercial",
        Industrial => "industrial",
        Military => "military",
        Retail => "retail",
        Farmland => "farmland",
        Farmyard => "farmyard",
        Forest => "forest",
        Meadow => "meadow",
        Grass => "grass",
        Orchard => "orchard",
        Vineyard => "vineyard",
        Quarry => "quarry",
        Cemetery => "cemetery",
        Allotments => "allotments",
        RecreationGround => "recreation_ground",
        VillageGreen => "village_green",
        Reservoir => "reservoir",
        Basin => "basin",
        Landfill => "landfill",
        Brownfield => "brownfield",
        Greenfield => "greenfield",
        Religious => "religious",
        Railway => "railway",
        Port => "port",
        Construction => "construction",
        Garages => "garages",
        Parking => "parking",
        Conservation => "conservation",
        NatureReserve => "nature_reserve",
    }
}

tag_enum! {
    /// `building=*`, also used for the `kind_detail` of tile JSON buildings.
    BuildingKind {
        Yes => "yes",
        House => "house",
        Apartments => "apartments",
        Commercial => "commercial",
        Industrial => "industrial",
        Retail => "retail",
        Residential => "residential",
        Church => "church",
        Cathedral => "cathedral",
        School => "school",
        Hospital => "hospital",
        Warehouse => "warehouse",
        Garage => "garage",
        Shed => "shed",
        Hut => "hut",
        Cabin => "cabin",
        Barn => "barn",
        Detached => "detached",
        Public => "public",
        Kiosk => "kiosk",
        Office => "office",
        Bunker => "bunker",
        Hotel => "hotel",
        Dormitory => "dormitory",
        Stable => "stable",
        Roof => "roof",
        TrainStation => "train_station",
        Service => "service",
        Terrace => "terrace",
        Supermarket => "supermarket",
        University => "university",
        GarageDetached => "garage_detached",
        Construction => "construction",
        Ruins => "ruins",
        Mosque => "mosque",
        Temple => "temple",
        Civic => "civic",
        SportsHall => "sports_hall",
        Hangar => "hangar",
        StaticCaravan => "static_caravan",
        Greenhouse => "greenhouse",
    }
}

tag_enum! {
    /// `roof:shape=*`
    RoofShape {
        Flat => "flat",
        Gabled => "gabled",
        Hipped => "hipped",
        Pitched => "pitched",
        Gambrel => "gambrel",
        Mansard => "mansard",
        HalfHipped => "half_hipped" | "half-hipped",
        Round => "round",
        Saltbox => "saltbox",
        Skillion => "skillion",
        Dome => "dome",
        Pyramidal => "pyramidal",
        Onion => "onion",
        Bonnet => "bonnet",
        Sawtooth => "sawtooth",
        Tent => "tent",
        Butterfly => "butterfly",
        SideHipped => "side_hipped",
        Barrel => "barrel",
        Conical => "conical",
        Hexagonal => "hexagonal",
        CrossGabled => "cross_gabled",
    }
}

tag_enum! {
    /// `building:material=*`
    BuildingMaterial {
        Brick => "brick",
        Concrete => "concrete",
        ReinforcedConcrete => "reinforced_concrete",
        CementBlock => "cement_block",
        Wood => "wood",
        TimberFraming => "timber_framing",
        Stone => "stone",
        Sandstone => "sandstone",
        Limestone => "limestone",
        Glass => "glass",
        Metal => "metal",
        Steel => "steel",
        Plaster => "plaster",
        Mud => "mud" | "adobe",
        Plastic => "plastic",
    }
}

tag_enum! {
    /// `building:colour=*` and `roof:colour=*`. Synonyms and the usual hex codes map to one value.
    ColorProperty {
        White => "white" | "#ffffff" | "#fff",
        Black => "black" | "#000000" | "#000",
        Gray => "gray" | "grey" | "#808080",
        Silver => "silver" | "#c0c0c0",
        Red => "red" | "#ff0000" | "#f00",
        Maroon => "maroon" | "#800000",
        Yellow => "yellow" | "#ffff00",
        Olive => "olive" | "#808000",
        Lime => "lime" | "#00ff00",
        Green => "green" | "#008000",
        Cyan => "cyan" | "aqua" | "#00ffff",
        Teal => "teal" | "#008080",
        Blue => "blue" | "#0000ff",
        Navy => "navy" | "#000080",
        Magenta => "magenta" | "fuchsia" | "#ff00ff",
        Purple => "purple" | "#800080",
        Orange => "orange" | "#ffa500",
        Brown => "brown" | "#a52a2a",
        Beige => "beige" | "#f5f5dc",
        Pink => "pink" | "#ffc0cb",
        Tan => "tan" | "#d2b48c",
    }
}

impl ColorProperty {
    /// Colour tags are free-form; compare case-insensitively and ignore surrounding space.
    pub fn from_colour_tag(value: &str) -> Self {
        ColorProperty::from_tag(&value.trim().to_ascii_lowercase())
    }
}
