use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    DeriveInput,
    Ident,
    Type,
    parse_macro_input,
};

#[derive(Debug)]
struct Field {
    name: Ident,
    map: Ident,
    map_key: Type,
    map_val: Type,
}

/// Derive our ledger impl.
///
/// Effectively, we collect any BTreeMap/HashMap fields in the struct (ignoring
/// others) and implement things like get_<field>, track_<field> and
/// total_<field> as well as some aggregate helpers over all of the maps.
#[proc_macro_derive(Ledger)]
pub fn derive_ledger(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    // grab our map fields from the input
    let fields: Vec<Field> = match &input.data {
        syn::Data::Struct(syn::DataStruct { fields: syn::Fields::Named(syn::FieldsNamed { named: fields, .. }), .. }) => {
            fields.iter()
                .map(|field| {
                    (
                        field.ident.as_ref().unwrap().clone(),
                        match &field.ty {
                            syn::Type::Path(syn::TypePath { path: syn::Path { segments, .. }, .. }) => {
                                segments.last().cloned()
                            }
                            _ => None,
                        }
                    )
                })
                .filter(|fieldspec| {
                    match &fieldspec.1 {
                        Some(path) => {
                            path.ident == "BTreeMap" || path.ident == "HashMap"
                        }
                        None => false,
                    }
                })
                .map(|(fieldname, segment)| {
                    let segment = segment.unwrap();
                    let args = match segment.arguments {
                        syn::PathArguments::AngleBracketed(syn::AngleBracketedGenericArguments { args, .. }) => {
                            args.iter()
                                .map(|arg| {
                                    match arg {
                                        syn::GenericArgument::Type(ty) => ty.clone(),
                                        _ => panic!("ledger-derive::derive_ledger() -- error parsing map args"),
                                    }
                                })
                                .collect::<Vec<_>>()
                        }
                        _ => panic!("ledger-derive::derive_ledger() -- error parsing map fields"),
                    };
                    if args.len() != 2 {
                        panic!("ledger-derive::derive_ledger() -- maps must have exactly a key and a value type");
                    }
                    Field {
                        name: fieldname,
                        map: segment.ident.clone(),
                        map_key: args[0].clone(),
                        map_val: args[1].clone(),
                    }
                })
                .collect::<Vec<_>>()
        }
        _ => panic!("ledger-derive::derive_ledger() -- can only derive a ledger on a struct"),
    };

    let fn_get = fields.iter().map(|f| format_ident!("get_{}", f.name)).collect::<Vec<_>>();
    let fn_get_comment = fields.iter().map(|f| format!("Get a {} entry out of this ledger, defaulting to zero if not found", f.name)).collect::<Vec<_>>();
    let fn_set = fields.iter().map(|f| format_ident!("set_{}", f.name)).collect::<Vec<_>>();
    let fn_set_comment = fields.iter().map(|f| format!("Overwrite a {} entry. Zero entries are removed.", f.name)).collect::<Vec<_>>();
    let fn_track = fields.iter().map(|f| format_ident!("track_{}", f.name)).collect::<Vec<_>>();
    let fn_track_comment = fields.iter().map(|f| format!("Add a (possibly negative) amount to a {} entry", f.name)).collect::<Vec<_>>();
    let fn_total = fields.iter().map(|f| format_ident!("total_{}", f.name)).collect::<Vec<_>>();
    let fn_total_comment = fields.iter().map(|f| format!("Sum all {} entries", f.name)).collect::<Vec<_>>();
    let fn_scale = fields.iter().map(|f| format_ident!("scale_{}", f.name)).collect::<Vec<_>>();
    let fn_scale_comment = fields.iter().map(|f| format!("Multiply every {} entry by `factor`, returning how much each entry shrank", f.name)).collect::<Vec<_>>();
    let fn_clear = fields.iter().map(|f| format_ident!("clear_{}", f.name)).collect::<Vec<_>>();
    let fn_clear_comment = fields.iter().map(|f| format!("Remove all {} entries, returning them", f.name)).collect::<Vec<_>>();
    let field_name = fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
    let field_map = fields.iter().map(|f| f.map.clone()).collect::<Vec<_>>();
    let field_mapkey = fields.iter().map(|f| f.map_key.clone()).collect::<Vec<_>>();
    let field_mapval = fields.iter().map(|f| f.map_val.clone()).collect::<Vec<_>>();
    let total_val = fields.first().map(|f| f.map_val.clone())
        .unwrap_or_else(|| panic!("ledger-derive::derive_ledger() -- ledger needs at least one map field"));

    let ledger_impl = quote! {
        impl #name {
            #(
                #[doc = #fn_get_comment]
                pub fn #fn_get<T: Into<#field_mapkey>>(&self, id: T) -> #field_mapval {
                    let id: #field_mapkey = id.into();
                    self.#field_name.get(&id)
                        .cloned()
                        .unwrap_or_else(<#field_mapval as rust_decimal::prelude::Zero>::zero)
                }
            )*
            #(
                #[doc = #fn_set_comment]
                pub fn #fn_set<T, V>(&mut self, id: T, val: V)
                    where T: Into<#field_mapkey>,
                          V: Into<#field_mapval>,
                {
                    let val: #field_mapval = val.into();
                    let id: #field_mapkey = id.into();
                    if rust_decimal::prelude::Zero::is_zero(&val) {
                        self.#field_name.remove(&id);
                    } else {
                        self.#field_name.insert(id, val);
                    }
                }
            )*
            #(
                #[doc = #fn_track_comment]
                pub fn #fn_track<T, V>(&mut self, id: T, val: V)
                    where T: Into<#field_mapkey>,
                          V: Into<#field_mapval>,
                {
                    let val: #field_mapval = val.into();
                    let entry = self.#field_name.entry(id.into()).or_insert_with(<#field_mapval as rust_decimal::prelude::Zero>::zero);
                    *entry += val;
                    self.dezero();
                }
            )*
            #(
                #[doc = #fn_total_comment]
                pub fn #fn_total(&self) -> #field_mapval {
                    let mut total = <#field_mapval as rust_decimal::prelude::Zero>::zero();
                    for (_, val) in self.#field_name.iter() {
                        total += *val;
                    }
                    total
                }
            )*
            #(
                #[doc = #fn_scale_comment]
                pub fn #fn_scale(&mut self, factor: #field_mapval) -> #field_map<#field_mapkey, #field_mapval> {
                    let mut shrank = #field_map::new();
                    for (key, val) in self.#field_name.iter_mut() {
                        let scaled = *val * factor;
                        shrank.insert(key.clone(), *val - scaled);
                        *val = scaled;
                    }
                    self.dezero();
                    shrank
                }
            )*
            #(
                #[doc = #fn_clear_comment]
                pub fn #fn_clear(&mut self) -> #field_map<#field_mapkey, #field_mapval> {
                    std::mem::replace(&mut self.#field_name, #field_map::new())
                }
            )*

            /// Sum every entry across all of this ledger's maps
            pub fn total(&self) -> #total_val {
                let mut total = <#total_val as rust_decimal::prelude::Zero>::zero();
                #(
                    total += self.#fn_total();
                )*
                total
            }

            /// Test if we have an empty ledger
            pub fn is_zero(&self) -> bool {
                #(
                    for (_, val) in self.#field_name.iter() {
                        if !rust_decimal::prelude::Zero::is_zero(val) {
                            return false;
                        }
                    }
                )*
                true
            }

            /// Determine if any of our entries are below 0
            pub fn has_negative(&self) -> bool {
                #(
                    for (_, val) in self.#field_name.iter() {
                        if *val < <#field_mapval as rust_decimal::prelude::Zero>::zero() {
                            return true;
                        }
                    }
                )*
                false
            }

            /// Remove all zero values from our maps.
            fn dezero(&mut self) {
                #(
                    self.#field_name.retain(|_, val| !rust_decimal::prelude::Zero::is_zero(val));
                )*
            }
        }
    };
    TokenStream::from(ledger_impl)
}
