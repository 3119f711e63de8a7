//! Implementation of the Entity derive macro.
//!
//! This module turns `#[entity(...)]` markers into an `Entity` implementation:
//! the declaration returned by `definition()` plus name-based field accessors.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type};

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$";

/// Parsed entity definition from a struct with `#[derive(Entity)]`.
#[derive(Debug)]
pub struct EntityStruct {
    /// The struct name.
    pub name: Ident,
    /// Generics from the struct.
    pub generics: syn::Generics,
    /// `#[entity(table = "...")]`
    pub table: Option<LitStr>,
    /// Mapped (and ignored) fields in declaration order.
    pub fields: Vec<EntityField>,
    /// The embedded ancestor, if any.
    pub parent: Option<(Ident, Type)>,
}

/// Parsed markers for a single field.
#[derive(Debug)]
pub struct EntityField {
    pub name: Ident,
    pub ty: Type,
    pub column: Option<LitStr>,
    pub wire_type: Option<Ident>,
    pub id: Option<Ident>,
    pub version: bool,
    pub deleted: Option<(String, String)>,
    pub unique: bool,
    pub ignore: bool,
}

/// Parse a `DeriveInput` into an `EntityStruct`.
pub fn parse_entity(input: &DeriveInput) -> Result<EntityStruct> {
    let table = parse_struct_attrs(input)?;

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(Error::new_spanned(
                    &data.fields,
                    "Entity requires a struct with named fields",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not unions",
            ));
        }
    };

    let mut fields = Vec::new();
    let mut parent = None;
    for field in named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;
        if is_parent(field)? {
            if parent.is_some() {
                return Err(Error::new_spanned(field, "an entity can extend only one parent"));
            }
            parent = Some((ident, field.ty.clone()));
        } else {
            fields.push(parse_entity_field(ident, field)?);
        }
    }

    check_unique_role(&fields, |f| f.id.is_some(), "primary key")?;
    check_unique_role(&fields, |f| f.version, "version")?;
    check_unique_role(&fields, |f| f.deleted.is_some(), "soft-delete")?;

    Ok(EntityStruct {
        name: input.ident.clone(),
        generics: input.generics.clone(),
        table,
        fields,
        parent,
    })
}

fn parse_struct_attrs(input: &DeriveInput) -> Result<Option<LitStr>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                check_identifier(&lit)?;
                table = Some(lit);
                Ok(())
            } else {
                let attr_name = meta.path.to_token_stream().to_string();
                Err(meta.error(format!(
                    "unknown entity attribute `{attr_name}`. Valid struct attributes are: table"
                )))
            }
        })?;
    }
    Ok(table)
}

fn is_parent(field: &Field) -> Result<bool> {
    let mut parent = false;
    let mut others = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("parent") {
                parent = true;
            } else {
                others = true;
                if meta.input.peek(syn::Token![=]) {
                    // Parsed properly by `parse_entity_field`.
                    let _: syn::Lit = meta.value()?.parse()?;
                }
            }
            Ok(())
        })?;
    }
    if parent && others {
        return Err(Error::new_spanned(
            field,
            "`parent` cannot be combined with other entity attributes",
        ));
    }
    Ok(parent)
}

fn parse_entity_field(name: Ident, field: &Field) -> Result<EntityField> {
    let mut parsed = EntityField {
        name,
        ty: field.ty.clone(),
        column: None,
        wire_type: None,
        id: None,
        version: false,
        deleted: None,
        unique: false,
        ignore: false,
    };
    let mut deleted = None;
    let mut undeleted = None;
    let mut is_deleted = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("id") {
                let strategy = if meta.input.peek(syn::Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    id_variant(&lit)?
                } else {
                    format_ident!("Auto")
                };
                parsed.id = Some(strategy);
            } else if path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                check_identifier(&lit)?;
                parsed.column = Some(lit);
            } else if path.is_ident("sql_type") {
                let lit: LitStr = meta.value()?.parse()?;
                let variant = sql_type_variant(&lit.value()).ok_or_else(|| {
                    Error::new_spanned(&lit, format!("unknown sql_type `{}`", lit.value()))
                })?;
                parsed.wire_type = Some(format_ident!("{}", variant));
            } else if path.is_ident("version") {
                parsed.version = true;
            } else if path.is_ident("deleted") {
                is_deleted = true;
                if meta.input.peek(syn::Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    deleted = Some(lit.value());
                }
            } else if path.is_ident("undeleted") {
                let lit: LitStr = meta.value()?.parse()?;
                undeleted = Some(lit.value());
            } else if path.is_ident("unique") {
                parsed.unique = true;
            } else if path.is_ident("ignore") {
                parsed.ignore = true;
            } else {
                let attr_name = path.to_token_stream().to_string();
                return Err(Error::new_spanned(
                    path,
                    format!(
                        "unknown entity attribute `{attr_name}`. \
                         Valid attributes are: id, column, sql_type, version, deleted, \
                         undeleted, unique, ignore, parent"
                    ),
                ));
            }

            Ok(())
        })?;
    }

    if undeleted.is_some() && !is_deleted {
        return Err(Error::new_spanned(
            field,
            "`undeleted` requires `deleted` on the same field",
        ));
    }
    if is_deleted {
        parsed.deleted = Some((
            deleted.unwrap_or_else(|| "1".to_string()),
            undeleted.unwrap_or_else(|| "0".to_string()),
        ));
    }
    if parsed.ignore && (parsed.id.is_some() || parsed.version || is_deleted) {
        return Err(Error::new_spanned(
            field,
            "an ignored field cannot be a key, version or soft-delete field",
        ));
    }

    Ok(parsed)
}

fn check_unique_role(
    fields: &[EntityField],
    has_role: impl Fn(&EntityField) -> bool,
    role: &str,
) -> Result<()> {
    let mut claimed = fields.iter().filter(|f| has_role(f));
    if let (Some(first), Some(second)) = (claimed.next(), claimed.next()) {
        return Err(Error::new_spanned(
            &second.name,
            format!("more than one {role} field (`{}` already claims it)", first.name),
        ));
    }
    Ok(())
}

fn check_identifier(lit: &LitStr) -> Result<()> {
    let valid = regex::Regex::new(IDENTIFIER_PATTERN)
        .map_err(|e| Error::new_spanned(lit, format!("invalid identifier pattern: {e}")))?
        .is_match(&lit.value());
    if valid {
        Ok(())
    } else {
        Err(Error::new_spanned(
            lit,
            format!("`{}` is not a valid SQL identifier", lit.value()),
        ))
    }
}

fn id_variant(lit: &LitStr) -> Result<Ident> {
    let variant = match lit.value().to_ascii_lowercase().as_str() {
        "auto" | "identity" => "Auto",
        "uuid" => "Uuid",
        "snowflake" => "Snowflake",
        other => {
            return Err(Error::new_spanned(
                lit,
                format!("unknown id strategy `{other}`; expected auto, uuid or snowflake"),
            ));
        }
    };
    Ok(format_ident!("{}", variant))
}

/// Map a type name onto a `SqlType` variant, accepting the same aliases as
/// `SqlType::from_name`.
fn sql_type_variant(name: &str) -> Option<&'static str> {
    Some(match name.trim().to_ascii_uppercase().as_str() {
        "BOOLEAN" | "BOOL" | "BIT" => "Boolean",
        "INTEGER" | "INT" | "SMALLINT" | "TINYINT" => "Integer",
        "BIGINT" | "LONG" => "BigInt",
        "DOUBLE" | "FLOAT" | "REAL" => "Double",
        "DECIMAL" | "NUMERIC" => "Decimal",
        "VARCHAR" | "CHAR" | "NVARCHAR" => "Varchar",
        "TEXT" | "CLOB" | "LONGVARCHAR" => "Text",
        "BLOB" | "BINARY" | "VARBINARY" | "BYTEA" => "Blob",
        "UUID" | "OTHER" => "Uuid",
        "TIMESTAMP" | "DATETIME" => "Timestamp",
        "JSON" | "JSONB" => "Json",
        _ => return None,
    })
}

/// Generate the Entity trait implementation.
pub fn generate_entity_impl(def: &EntityStruct) -> TokenStream {
    let name = &def.name;
    let (impl_generics, ty_generics, where_clause) = def.generics.split_for_impl();

    let table_call = def.table.as_ref().map(|t| quote! { .table(#t) });
    let field_defs = def.fields.iter().map(generate_field_def);
    let parent_call = def.parent.as_ref().map(|(_, ty)| {
        quote! { .extends(<#ty as ::sqlmapper_core::Entity>::definition()) }
    });

    let get_arms = def.fields.iter().map(|f| {
        let ident = &f.name;
        let key = ident.to_string();
        if f.ignore {
            quote! { #key => None, }
        } else {
            quote! { #key => Some(::sqlmapper_core::FieldValue::to_value(&self.#ident)), }
        }
    });
    let set_arms = def.fields.iter().map(|f| {
        let ident = &f.name;
        let ty = &f.ty;
        let key = ident.to_string();
        if f.ignore {
            quote! { #key => Ok(()), }
        } else {
            quote! {
                #key => {
                    self.#ident = <#ty as ::sqlmapper_core::FieldValue>::from_value(value, #key)?;
                    Ok(())
                }
            }
        }
    });

    let (get_fallback, set_fallback) = match &def.parent {
        Some((ident, _)) => (
            quote! { ::sqlmapper_core::Entity::get_field(&self.#ident, name) },
            quote! { ::sqlmapper_core::Entity::set_field(&mut self.#ident, name, value) },
        ),
        None => (
            quote! { None },
            quote! { Err(::sqlmapper_core::unknown_field::<Self>(name)) },
        ),
    };

    quote! {
        impl #impl_generics ::sqlmapper_core::Entity for #name #ty_generics #where_clause {
            fn definition() -> ::sqlmapper_core::EntityDef {
                ::sqlmapper_core::EntityDef::new::<Self>()
                    #table_call
                    #(.field(#field_defs))*
                    #parent_call
            }

            fn get_field(&self, name: &str) -> Option<::sqlmapper_core::Value> {
                match name {
                    #(#get_arms)*
                    _ => #get_fallback,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: ::sqlmapper_core::Value,
            ) -> ::sqlmapper_core::Result<()> {
                match name {
                    #(#set_arms)*
                    _ => #set_fallback,
                }
            }
        }
    }
}

fn generate_field_def(field: &EntityField) -> TokenStream {
    let key = field.name.to_string();
    let ty = &field.ty;

    let sql_type = if field.ignore {
        quote! { ::sqlmapper_core::SqlType::Text }
    } else {
        quote! { <#ty as ::sqlmapper_core::FieldValue>::SQL_TYPE }
    };

    let mut calls = Vec::new();
    if let Some(column) = &field.column {
        calls.push(quote! { .column(#column) });
    }
    if let Some(variant) = &field.wire_type {
        calls.push(quote! { .wire_type(::sqlmapper_core::SqlType::#variant) });
    }
    if let Some(strategy) = &field.id {
        calls.push(quote! { .id(::sqlmapper_core::IdType::#strategy) });
    }
    if field.version {
        calls.push(quote! { .version() });
    }
    if let Some((deleted, undeleted)) = &field.deleted {
        calls.push(quote! { .deleted_with(#deleted, #undeleted) });
    }
    if field.unique {
        calls.push(quote! { .unique() });
    }
    if field.ignore {
        calls.push(quote! { .ignore() });
    }

    quote! {
        ::sqlmapper_core::FieldDef::new(#key, #sql_type) #(#calls)*
    }
}
