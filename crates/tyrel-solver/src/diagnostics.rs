//! Structured assignability failures.
//!
//! A failed check only yields `false`. When a caller wants to know why,
//! `explain_failure` walks the failing path again and builds a
//! `SubtypeFailureReason`; strings are produced later by
//! [`SubtypeFailureReason::render`], so no formatting happens on the fast path.

use crate::TypeDatabase;
use crate::TypeFormatter;
use crate::types::TypeId;
use std::fmt::Write;
use tyrel_common::interner::Atom;

/// Why `source` is not assignable to `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// A required property is missing in the source type.
    MissingProperty {
        property_name: Atom,
        source_type: TypeId,
        target_type: TypeId,
    },
    /// Property types are incompatible.
    PropertyTypeMismatch {
        property_name: Atom,
        source_property_type: TypeId,
        target_property_type: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// The source may omit a property the target requires.
    OptionalPropertyRequired { property_name: Atom },
    /// A field (or the whole source index signature, when `property_name` is
    /// `None`) does not fit the target index signature.
    IndexSignatureMismatch {
        property_name: Option<Atom>,
        source_value_type: TypeId,
        target_value_type: TypeId,
    },
    /// The source tuple has too few (or, under exact arity, too many) items.
    TupleArityMismatch {
        source_count: usize,
        target_count: usize,
    },
    TupleElementMismatch {
        index: usize,
        source_element: TypeId,
        target_element: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// Array or promise element types are incompatible.
    ElementTypeMismatch {
        source_element: TypeId,
        target_element: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// An invariant type parameter (set element, map key or value) differs.
    InvariantParameterMismatch {
        source_param: TypeId,
        target_param: TypeId,
    },
    ParameterCountMismatch {
        source_count: usize,
        target_count: usize,
    },
    /// The target's parameter is not assignable to the source's.
    ParameterTypeMismatch {
        param_index: usize,
        source_param: TypeId,
        target_param: TypeId,
    },
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// No member of the target union accepts the source.
    NoUnionMemberMatches {
        source_type: TypeId,
        target_union_members: Vec<TypeId>,
    },
    /// A member of the source union is not assignable.
    UnionMemberNotAssignable {
        member: TypeId,
        target_type: TypeId,
        nested_reason: Box<SubtypeFailureReason>,
    },
    /// No member of the source intersection is assignable.
    NoIntersectionMemberMatches {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// The source does not satisfy one member of the target intersection.
    IntersectionMemberMismatch {
        member: TypeId,
        nested_reason: Box<SubtypeFailureReason>,
    },
    /// The target is branded and the source carries another brand or none.
    BrandMismatch {
        source_brand: Option<Atom>,
        target_brand: Atom,
    },
    /// The comparison was cut off by a recursion limit.
    RecursionLimitExceeded {
        source_type: TypeId,
        target_type: TypeId,
    },
    /// Generic mismatch (no more specific reason).
    TypeMismatch {
        source_type: TypeId,
        target_type: TypeId,
    },
}

impl SubtypeFailureReason {
    /// Render as an indented, multi-line message; nested reasons are printed
    /// one level deeper below their parent.
    pub fn render(&self, db: &dyn TypeDatabase) -> String {
        let mut formatter = TypeFormatter::new(db);
        let mut out = String::new();
        self.render_into(db, &mut formatter, &mut out, 0);
        out
    }

    fn render_into(
        &self,
        db: &dyn TypeDatabase,
        fmt: &mut TypeFormatter<'_>,
        out: &mut String,
        indent: usize,
    ) {
        let pad = "  ".repeat(indent);
        let line = |out: &mut String, text: String| {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{pad}{text}");
        };
        let not_assignable = |fmt: &mut TypeFormatter<'_>, source: TypeId, target: TypeId| {
            format!(
                "Type '{}' is not assignable to type '{}'.",
                fmt.format(source),
                fmt.format(target)
            )
        };

        match self {
            Self::MissingProperty {
                property_name,
                source_type,
                target_type,
            } => line(
                out,
                format!(
                    "Property '{}' is missing in type '{}' but required in type '{}'.",
                    db.resolve_atom(*property_name),
                    fmt.format(*source_type),
                    fmt.format(*target_type)
                ),
            ),
            Self::PropertyTypeMismatch {
                property_name,
                source_property_type,
                target_property_type,
                nested_reason,
            } => {
                line(
                    out,
                    format!(
                        "Types of property '{}' are incompatible.",
                        db.resolve_atom(*property_name)
                    ),
                );
                Self::render_nested(
                    db,
                    fmt,
                    out,
                    indent + 1,
                    nested_reason.as_deref(),
                    *source_property_type,
                    *target_property_type,
                );
            }
            Self::OptionalPropertyRequired { property_name } => line(
                out,
                format!(
                    "Property '{}' is optional in the source type but required in the target type.",
                    db.resolve_atom(*property_name)
                ),
            ),
            Self::IndexSignatureMismatch {
                property_name,
                source_value_type,
                target_value_type,
            } => {
                let head = match property_name {
                    Some(name) => format!(
                        "Property '{}' is incompatible with index signature.",
                        db.resolve_atom(*name)
                    ),
                    None => "Index signatures are incompatible.".to_string(),
                };
                line(out, head);
                let detail = not_assignable(fmt, *source_value_type, *target_value_type);
                line(out, format!("  {detail}"));
            }
            Self::TupleArityMismatch {
                source_count,
                target_count,
            } => {
                let text = if source_count < target_count {
                    format!(
                        "Source has {source_count} element(s) but target requires {target_count}."
                    )
                } else {
                    format!(
                        "Source has {source_count} element(s) but target allows only {target_count}."
                    )
                };
                line(out, text);
            }
            Self::TupleElementMismatch {
                index,
                source_element,
                target_element,
                nested_reason,
            } => {
                line(
                    out,
                    format!(
                        "Type at position {index} in source is not compatible with type at position {index} in target."
                    ),
                );
                Self::render_nested(
                    db,
                    fmt,
                    out,
                    indent + 1,
                    nested_reason.as_deref(),
                    *source_element,
                    *target_element,
                );
            }
            Self::ElementTypeMismatch {
                source_element,
                target_element,
                nested_reason,
            } => {
                line(out, "Element types are incompatible.".to_string());
                Self::render_nested(
                    db,
                    fmt,
                    out,
                    indent + 1,
                    nested_reason.as_deref(),
                    *source_element,
                    *target_element,
                );
            }
            Self::InvariantParameterMismatch {
                source_param,
                target_param,
            } => line(
                out,
                format!(
                    "Type parameter is invariant: '{}' and '{}' are not mutually assignable.",
                    fmt.format(*source_param),
                    fmt.format(*target_param)
                ),
            ),
            Self::ParameterCountMismatch {
                source_count,
                target_count,
            } => line(
                out,
                format!(
                    "Source signature takes {source_count} parameter(s) but target signature takes {target_count}."
                ),
            ),
            Self::ParameterTypeMismatch {
                param_index,
                source_param,
                target_param,
            } => {
                line(
                    out,
                    format!("Types of parameters at position {param_index} are incompatible."),
                );
                let detail = not_assignable(fmt, *target_param, *source_param);
                line(out, format!("  {detail}"));
            }
            Self::ReturnTypeMismatch {
                source_return,
                target_return,
                nested_reason,
            } => {
                line(out, "Return types are incompatible.".to_string());
                Self::render_nested(
                    db,
                    fmt,
                    out,
                    indent + 1,
                    nested_reason.as_deref(),
                    *source_return,
                    *target_return,
                );
            }
            Self::NoUnionMemberMatches {
                source_type,
                target_union_members,
            } => {
                let members: Vec<String> = target_union_members
                    .iter()
                    .map(|&member| fmt.format(member))
                    .collect();
                line(
                    out,
                    format!(
                        "Type '{}' is not assignable to any member of '{}'.",
                        fmt.format(*source_type),
                        members.join(" | ")
                    ),
                );
            }
            Self::UnionMemberNotAssignable {
                member,
                target_type,
                nested_reason,
            } => {
                line(out, not_assignable(fmt, *member, *target_type));
                nested_reason.render_into(db, fmt, out, indent + 1);
            }
            Self::NoIntersectionMemberMatches {
                source_type,
                target_type,
            } => line(
                out,
                format!(
                    "No member of intersection '{}' is assignable to type '{}'.",
                    fmt.format(*source_type),
                    fmt.format(*target_type)
                ),
            ),
            Self::IntersectionMemberMismatch {
                member,
                nested_reason,
            } => {
                line(
                    out,
                    format!(
                        "Type does not satisfy intersection member '{}'.",
                        fmt.format(*member)
                    ),
                );
                nested_reason.render_into(db, fmt, out, indent + 1);
            }
            Self::BrandMismatch {
                source_brand,
                target_brand,
            } => {
                let target = db.resolve_atom(*target_brand);
                let text = match source_brand {
                    Some(source) => format!(
                        "Brand '{}' is not assignable to brand '{target}'.",
                        db.resolve_atom(*source)
                    ),
                    None => format!("Type is missing brand '{target}'."),
                };
                line(out, text);
            }
            Self::RecursionLimitExceeded {
                source_type,
                target_type,
            } => line(
                out,
                format!(
                    "Excessive depth comparing '{}' and '{}'; treated as not assignable.",
                    fmt.format(*source_type),
                    fmt.format(*target_type)
                ),
            ),
            Self::TypeMismatch {
                source_type,
                target_type,
            } => line(out, not_assignable(fmt, *source_type, *target_type)),
        }
    }

    fn render_nested(
        db: &dyn TypeDatabase,
        fmt: &mut TypeFormatter<'_>,
        out: &mut String,
        indent: usize,
        nested: Option<&SubtypeFailureReason>,
        source: TypeId,
        target: TypeId,
    ) {
        let fallback;
        let nested = match nested {
            Some(reason) => reason,
            None => {
                fallback = SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                };
                &fallback
            }
        };
        nested.render_into(db, fmt, out, indent);
    }
}
