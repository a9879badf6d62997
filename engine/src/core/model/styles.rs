//! Style Model
//!
//! Ordered style records of a document, addressed by stable [`StyleId`]s.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    arena::{Numbered, OrderedArena, Removed},
    FieldValue, DEFAULT_STYLE,
};
use crate::core::{CoreError, CoreResult, StyleId};

/// Style removed from (or re-inserted into) the model
pub type RemovedStyle = Removed<StyleId, StyleRecord>;

// =============================================================================
// Field Keys
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleField {
    Name,
    FontName,
    FontSize,
    PrimaryColour,
    SecondaryColour,
    OutlineColour,
    BackColour,
    Bold,
    Italic,
    Underline,
    Strikeout,
    ScaleX,
    ScaleY,
    Spacing,
    Angle,
    BorderStyle,
    Outline,
    Shadow,
    Alignment,
    MarginL,
    MarginR,
    MarginV,
    Encoding,
}

impl StyleField {
    pub const ALL: [StyleField; 23] = [
        StyleField::Name,
        StyleField::FontName,
        StyleField::FontSize,
        StyleField::PrimaryColour,
        StyleField::SecondaryColour,
        StyleField::OutlineColour,
        StyleField::BackColour,
        StyleField::Bold,
        StyleField::Italic,
        StyleField::Underline,
        StyleField::Strikeout,
        StyleField::ScaleX,
        StyleField::ScaleY,
        StyleField::Spacing,
        StyleField::Angle,
        StyleField::BorderStyle,
        StyleField::Outline,
        StyleField::Shadow,
        StyleField::Alignment,
        StyleField::MarginL,
        StyleField::MarginR,
        StyleField::MarginV,
        StyleField::Encoding,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StyleField::Name => "name",
            StyleField::FontName => "font-name",
            StyleField::FontSize => "font-size",
            StyleField::PrimaryColour => "primary-colour",
            StyleField::SecondaryColour => "secondary-colour",
            StyleField::OutlineColour => "outline-colour",
            StyleField::BackColour => "back-colour",
            StyleField::Bold => "bold",
            StyleField::Italic => "italic",
            StyleField::Underline => "underline",
            StyleField::Strikeout => "strikeout",
            StyleField::ScaleX => "scale-x",
            StyleField::ScaleY => "scale-y",
            StyleField::Spacing => "spacing",
            StyleField::Angle => "angle",
            StyleField::BorderStyle => "border-style",
            StyleField::Outline => "outline",
            StyleField::Shadow => "shadow",
            StyleField::Alignment => "alignment",
            StyleField::MarginL => "margin-l",
            StyleField::MarginR => "margin-r",
            StyleField::MarginV => "margin-v",
            StyleField::Encoding => "encoding",
        }
    }
}

impl fmt::Display for StyleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StyleField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

// =============================================================================
// Record
// =============================================================================

/// One named style (font, colours, borders, placement)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    pub num: usize,
    pub name: String,
    pub font_name: String,
    pub font_size: f64,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub scale_x: f64,
    pub scale_y: f64,
    pub spacing: f64,
    pub angle: f64,
    pub border_style: i64,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: i64,
    pub margin_l: i64,
    pub margin_r: i64,
    pub margin_v: i64,
    pub encoding: i64,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            num: 0,
            name: DEFAULT_STYLE.to_string(),
            font_name: "Sans".to_string(),
            font_size: 18.0,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H0000FFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 0,
        }
    }
}

impl Numbered for StyleRecord {
    fn num(&self) -> usize {
        self.num
    }

    fn set_num(&mut self, num: usize) {
        self.num = num;
    }
}

impl StyleRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, field: StyleField) -> FieldValue {
        match field {
            StyleField::Name => FieldValue::Text(self.name.clone()),
            StyleField::FontName => FieldValue::Text(self.font_name.clone()),
            StyleField::FontSize => FieldValue::Decimal(self.font_size),
            StyleField::PrimaryColour => FieldValue::Text(self.primary_colour.clone()),
            StyleField::SecondaryColour => FieldValue::Text(self.secondary_colour.clone()),
            StyleField::OutlineColour => FieldValue::Text(self.outline_colour.clone()),
            StyleField::BackColour => FieldValue::Text(self.back_colour.clone()),
            StyleField::Bold => FieldValue::Bool(self.bold),
            StyleField::Italic => FieldValue::Bool(self.italic),
            StyleField::Underline => FieldValue::Bool(self.underline),
            StyleField::Strikeout => FieldValue::Bool(self.strikeout),
            StyleField::ScaleX => FieldValue::Decimal(self.scale_x),
            StyleField::ScaleY => FieldValue::Decimal(self.scale_y),
            StyleField::Spacing => FieldValue::Decimal(self.spacing),
            StyleField::Angle => FieldValue::Decimal(self.angle),
            StyleField::BorderStyle => FieldValue::Integer(self.border_style),
            StyleField::Outline => FieldValue::Decimal(self.outline),
            StyleField::Shadow => FieldValue::Decimal(self.shadow),
            StyleField::Alignment => FieldValue::Integer(self.alignment),
            StyleField::MarginL => FieldValue::Integer(self.margin_l),
            StyleField::MarginR => FieldValue::Integer(self.margin_r),
            StyleField::MarginV => FieldValue::Integer(self.margin_v),
            StyleField::Encoding => FieldValue::Integer(self.encoding),
        }
    }

    pub(crate) fn put(&mut self, field: StyleField, value: FieldValue) -> CoreResult<()> {
        let key = field.key();
        match field {
            StyleField::Name => self.name = value.into_text(),
            StyleField::FontName => self.font_name = value.into_text(),
            StyleField::FontSize => self.font_size = value.as_decimal(key)?,
            StyleField::PrimaryColour => self.primary_colour = value.into_text(),
            StyleField::SecondaryColour => self.secondary_colour = value.into_text(),
            StyleField::OutlineColour => self.outline_colour = value.into_text(),
            StyleField::BackColour => self.back_colour = value.into_text(),
            StyleField::Bold => self.bold = value.as_bool(key)?,
            StyleField::Italic => self.italic = value.as_bool(key)?,
            StyleField::Underline => self.underline = value.as_bool(key)?,
            StyleField::Strikeout => self.strikeout = value.as_bool(key)?,
            StyleField::ScaleX => self.scale_x = value.as_decimal(key)?,
            StyleField::ScaleY => self.scale_y = value.as_decimal(key)?,
            StyleField::Spacing => self.spacing = value.as_decimal(key)?,
            StyleField::Angle => self.angle = value.as_decimal(key)?,
            StyleField::BorderStyle => self.border_style = value.as_integer(key)?,
            StyleField::Outline => self.outline = value.as_decimal(key)?,
            StyleField::Shadow => self.shadow = value.as_decimal(key)?,
            StyleField::Alignment => self.alignment = value.as_integer(key)?,
            StyleField::MarginL => self.margin_l = value.as_integer(key)?,
            StyleField::MarginR => self.margin_r = value.as_integer(key)?,
            StyleField::MarginV => self.margin_v = value.as_integer(key)?,
            StyleField::Encoding => self.encoding = value.as_integer(key)?,
        }
        Ok(())
    }
}

// =============================================================================
// Style Model
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct StyleModel {
    records: OrderedArena<StyleId, StyleRecord>,
}

impl StyleModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: StyleId) -> Option<&StyleRecord> {
        self.records.get(id)
    }

    pub fn record(&self, id: StyleId) -> CoreResult<&StyleRecord> {
        self.records.try_get(id)
    }

    pub fn position(&self, id: StyleId) -> CoreResult<usize> {
        self.records.position(id)
    }

    pub fn id_at(&self, position: usize) -> Option<StyleId> {
        self.records.id_at(position)
    }

    pub fn ids(&self) -> &[StyleId] {
        self.records.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &StyleRecord)> + '_ {
        self.records.iter()
    }

    /// First style with this name, in document order
    pub fn find_by_name(&self, name: &str) -> Option<StyleId> {
        self.records
            .iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| id)
    }

    pub(crate) fn allocate_id(&mut self) -> StyleId {
        self.records.allocate()
    }

    pub(crate) fn insert_records(&mut self, entries: Vec<RemovedStyle>) -> CoreResult<Vec<StyleId>> {
        let ids = entries.iter().map(|entry| entry.id).collect();
        self.records.insert_many(entries)?;
        Ok(ids)
    }

    pub(crate) fn remove_records(&mut self, ids: &[StyleId]) -> CoreResult<Vec<RemovedStyle>> {
        self.records.remove_many(ids)
    }

    pub(crate) fn set_field(&mut self, id: StyleId, field: StyleField, value: FieldValue) -> CoreResult<()> {
        self.records.try_get_mut(id)?.put(field, value)
    }
}
