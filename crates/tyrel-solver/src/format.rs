//! Type formatting for diagnostics.
//!
//! Produces TypeScript-like text (`{ id: string; tags?: string[] }`,
//! `(arg0: string) => number`, `string & BRAND<"UserId">`). Output is bounded:
//! wide shapes are elided after `MAX_FORMATTED_MEMBERS` members, deep ones
//! after `MAX_FORMAT_DEPTH` levels, and a lazy node met again while it is
//! being printed is shown as `<recursive>`.

use crate::TypeDatabase;
use crate::def::DefId;
use crate::recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use std::fmt::Write;
use tyrel_common::limits::MAX_FORMATTED_MEMBERS;

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    lazy_guard: RecursionGuard<DefId>,
    depth: DepthCounter,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            lazy_guard: RecursionGuard::with_profile(RecursionProfile::Formatting),
            depth: DepthCounter::with_profile(RecursionProfile::Formatting),
        }
    }

    pub fn format(&mut self, id: TypeId) -> String {
        if !self.depth.enter() {
            return "...".to_string();
        }
        let text = self.format_inner(id);
        self.depth.leave();
        text
    }

    fn format_inner(&mut self, id: TypeId) -> String {
        let Some(data) = self.db.lookup(id) else {
            return format!("<unknown #{}>", id.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(value) => self.format_literal(&value),
            TypeData::Enum(list) => self.format_members(list, " | "),
            TypeData::Array(element) => {
                let inner = self.format_operand(element);
                format!("{inner}[]")
            }
            TypeData::Tuple(shape_id) => {
                let shape = self.db.tuple_shape(shape_id);
                let mut parts: Vec<String> =
                    shape.items.iter().map(|&item| self.format(item)).collect();
                if let Some(rest) = shape.rest {
                    let inner = self.format_operand(rest);
                    parts.push(format!("...{inner}[]"));
                }
                format!("[{}]", parts.join(", "))
            }
            TypeData::Object(shape_id) => {
                let shape = self.db.object_shape(shape_id);
                self.format_object(&shape)
            }
            TypeData::Record { key, value } => {
                format!("Record<{}, {}>", self.format(key), self.format(value))
            }
            TypeData::Map { key, value } => {
                format!("Map<{}, {}>", self.format(key), self.format(value))
            }
            TypeData::Set(element) => format!("Set<{}>", self.format(element)),
            TypeData::Promise(inner) => format!("Promise<{}>", self.format(inner)),
            TypeData::Function(shape_id) => {
                let shape = self.db.function_shape(shape_id);
                self.format_function(&shape)
            }
            TypeData::Union(list) => self.format_members(list, " | "),
            TypeData::Intersection(list) => self.format_members(list, " & "),
            TypeData::Lazy(def_id) => self.format_lazy(def_id),
            TypeData::Branded { base, brand } => {
                let base = self.format_operand(base);
                format!("{base} & BRAND<\"{}\">", self.db.resolve_atom(brand))
            }
        }
    }

    fn format_literal(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::String(atom) => format!("{:?}", &*self.db.resolve_atom(*atom)),
            LiteralValue::Number(n) => format_number(n.0),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::BigInt(digits) => format!("{}n", self.db.resolve_atom(*digits)),
        }
    }

    /// Format a type used as an operand of `[]` or `&`, parenthesized when
    /// it would otherwise bind wrongly.
    fn format_operand(&mut self, id: TypeId) -> String {
        let text = self.format(id);
        match self.db.lookup(id) {
            Some(
                TypeData::Union(_)
                | TypeData::Enum(_)
                | TypeData::Intersection(_)
                | TypeData::Function(_),
            ) => format!("({text})"),
            _ => text,
        }
    }

    fn format_members(&mut self, list: TypeListId, separator: &str) -> String {
        let members = self.db.type_list(list);
        let mut parts: Vec<String> = members
            .iter()
            .take(MAX_FORMATTED_MEMBERS)
            .map(|&member| self.format_operand(member))
            .collect();
        if members.len() > MAX_FORMATTED_MEMBERS {
            parts.push(format!("... {} more ...", members.len() - MAX_FORMATTED_MEMBERS));
        }
        parts.join(separator)
    }

    fn format_object(&mut self, shape: &ObjectShape) -> String {
        if shape.properties.is_empty() && shape.index.is_none() {
            return "{}".to_string();
        }
        // Atom order is an interning detail; print fields alphabetically.
        let mut named: Vec<_> = shape
            .properties
            .iter()
            .map(|prop| (self.db.resolve_atom(prop.name), prop))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::from("{ ");
        for (name, prop) in named.into_iter().take(MAX_FORMATTED_MEMBERS) {
            let marker = if prop.optional { "?" } else { "" };
            let ty = self.format(prop.type_id);
            let _ = write!(out, "{name}{marker}: {ty}; ");
        }
        if shape.properties.len() > MAX_FORMATTED_MEMBERS {
            let _ = write!(
                out,
                "... {} more ...; ",
                shape.properties.len() - MAX_FORMATTED_MEMBERS
            );
        }
        if let Some(index) = shape.index {
            let key = self.format(index.key_type);
            let value = self.format(index.value_type);
            let _ = write!(out, "[key: {key}]: {value}; ");
        }
        out.truncate(out.len() - 2);
        out.push_str(" }");
        out
    }

    fn format_function(&mut self, shape: &FunctionShape) -> String {
        let mut params: Vec<String> = shape
            .params
            .iter()
            .enumerate()
            .map(|(i, &param)| format!("arg{i}: {}", self.format(param)))
            .collect();
        if let Some(rest) = shape.rest {
            let inner = self.format_operand(rest);
            params.push(format!("...rest: {inner}[]"));
        }
        let ret = self.format(shape.return_type);
        format!("({}) => {ret}", params.join(", "))
    }

    fn format_lazy(&mut self, def_id: DefId) -> String {
        match self.lazy_guard.enter(def_id) {
            RecursionResult::Entered => {
                let text = match self.db.resolve_lazy(def_id) {
                    Some(resolved) => self.format(resolved),
                    None => IntrinsicKind::Never.name().to_string(),
                };
                self.lazy_guard.leave(def_id);
                text
            }
            RecursionResult::Cycle => "<recursive>".to_string(),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                "...".to_string()
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeInterner;

    #[test]
    fn formats_primitives_and_literals() {
        let db = TypeInterner::new();
        let mut fmt = TypeFormatter::new(&db);
        assert_eq!(fmt.format(TypeId::STRING), "string");
        assert_eq!(fmt.format(TypeId::NAN), "NaN");
        assert_eq!(fmt.format(db.literal_string("a")), "\"a\"");
        assert_eq!(fmt.format(db.literal_number(1.0)), "1");
        assert_eq!(fmt.format(db.literal_number(1.5)), "1.5");
        assert_eq!(fmt.format(db.literal_bigint("10")), "10n");
        assert_eq!(fmt.format(db.literal_boolean(true)), "true");
    }

    #[test]
    fn formats_containers() {
        let db = TypeInterner::new();
        let mut fmt = TypeFormatter::new(&db);
        let union = db.union2(TypeId::STRING, TypeId::NUMBER);
        assert_eq!(fmt.format(db.array(union)), "(string | number)[]");
        assert_eq!(
            fmt.format(db.tuple(vec![TypeId::STRING], Some(TypeId::NUMBER))),
            "[string, ...number[]]"
        );
        assert_eq!(
            fmt.format(db.map(TypeId::STRING, TypeId::DATE)),
            "Map<string, Date>"
        );
        assert_eq!(
            fmt.format(db.function(FunctionShape::new(vec![TypeId::STRING], TypeId::VOID))),
            "(arg0: string) => void"
        );
    }

    #[test]
    fn formats_objects_and_brands() {
        let db = TypeInterner::new();
        let mut fmt = TypeFormatter::new(&db);
        let obj = db.object(vec![
            PropertyInfo::new(db.intern_string("id"), TypeId::STRING),
            PropertyInfo::optional(db.intern_string("age"), TypeId::NUMBER),
        ]);
        assert_eq!(fmt.format(obj), "{ age?: number; id: string }");
        assert_eq!(fmt.format(db.object(Vec::new())), "{}");
        assert_eq!(
            fmt.format(db.branded(TypeId::STRING, "UserId")),
            "string & BRAND<\"UserId\">"
        );
    }

    #[test]
    fn recursive_lazy_is_elided() {
        let db = TypeInterner::new();
        let list = db.lazy_recursive(|db, this| {
            db.object(vec![PropertyInfo::new(db.intern_string("next"), this)])
        });
        let mut fmt = TypeFormatter::new(&db);
        assert_eq!(fmt.format(list), "{ next: <recursive> }");
    }
}
