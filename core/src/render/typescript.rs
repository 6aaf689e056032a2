#![deny(missing_docs)]

//! # TypeScript + zod Target
//!
//! Renders a `ClientModule` as one TypeScript module:
//! 1. `import { z } from "zod";` and the runtime helpers.
//! 2. Component validators in dependency order, then one inferred type per component.
//! 3. Inline (per-operation) validators.
//! 4. `ClientConfig` and the `createClient` factory returning the nested call tree.

use crate::client::naming::{is_identifier, sanitize_identifier};
use crate::client::{ClientTreeNode, Endpoint};
use crate::components::SchemaDecl;
use crate::error::AppResult;
use crate::module::ClientModule;
use crate::render::writer::CodeWriter;
use crate::render::ClientTarget;
use crate::validator::{ObjectMode, Validator};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

const HEADER: &str = "// This file is generated. Do not edit it by hand.";

/// Top-level names the module itself declares.
const RESERVED: &[&str] = &[
    "z",
    "ClientConfig",
    "ApiRequestError",
    "ApiConfigError",
    "requireApiUrl",
    "readJson",
    "toQueryString",
    "createClient",
];

const RUNTIME_HELPERS: &str = r#"export class ApiRequestError extends Error {
  readonly status: number;
  readonly statusText: string;
  readonly body: unknown;

  constructor(status: number, statusText: string, body: unknown) {
    super(`Request failed with status ${status} ${statusText}`);
    this.name = "ApiRequestError";
    this.status = status;
    this.statusText = statusText;
    this.body = body;
  }
}

export class ApiConfigError extends Error {
  constructor(message: string) {
    super(message);
    this.name = "ApiConfigError";
  }
}

function requireApiUrl(config: ClientConfig): string {
  const apiUrl = (config.apiUrl ?? "").trim();
  if (!/^https?:\/\//i.test(apiUrl)) {
    throw new ApiConfigError("apiUrl must be an absolute http(s) URL");
  }
  return apiUrl.replace(/\/+$/, "");
}

async function readJson(response: Response): Promise<unknown> {
  const text = await response.text();
  if (!text.trim()) {
    return null;
  }
  try {
    return JSON.parse(text);
  } catch (error) {
    if (response.status < 200 || response.status >= 400) {
      return text;
    }
    throw error;
  }
}

function toQueryString(params: Record<string, unknown>): string {
  const search = new URLSearchParams();
  const append = (key: string, value: unknown) => {
    if (value === undefined || value === null) {
      return;
    }
    search.append(key, typeof value === "object" ? JSON.stringify(value) : String(value));
  };
  for (const [key, value] of Object.entries(params)) {
    if (Array.isArray(value)) {
      value.forEach((item) => append(key, item));
    } else {
      append(key, value);
    }
  }
  return search.toString();
}"#;

/// The TypeScript + zod renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptZodTarget;

impl ClientTarget for TypeScriptZodTarget {
    fn name(&self) -> &'static str {
        "typescript-zod"
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn render_module(&self, module: &ClientModule) -> AppResult<String> {
        let ids = Identifiers::for_module(module);
        let mut w = CodeWriter::default();
        w.line(HEADER);
        w.line("import { z } from \"zod\";").blank();
        w.line(RUNTIME_HELPERS).blank();

        for decl in &module.components {
            render_declaration(&mut w, decl, &ids);
        }
        w.blank();
        for decl in &module.components {
            w.line(format!(
                "export type {} = z.infer<typeof {}>;",
                ids.type_name(&decl.name),
                ids.schema(&decl.name)
            ));
        }
        w.blank();
        for decl in &module.inline {
            render_declaration(&mut w, decl, &ids);
        }
        w.blank();

        w.open("export type ClientConfig = {")
            .line("accessToken: string;")
            .line("apiUrl: string;")
            .close("};")
            .blank();

        w.open("export function createClient(config: ClientConfig) {");
        w.open("return {");
        render_node(&mut w, &module.tree, &ids);
        w.close("};");
        w.close("}");

        Ok(w.finish())
    }
}

/// Declared schema names mapped to unique TypeScript identifiers.
///
/// Names are sanitized, then suffixed with a number when they clash with an
/// earlier declaration or with a name the module reserves. Lookups stay keyed
/// by the declared name, so `$ref` targets resolve to the renamed identifier.
#[derive(Debug, Clone, Default)]
pub struct Identifiers {
    names: HashMap<String, String>,
}

impl Identifiers {
    /// Assigns identifiers to every component, then every inline declaration.
    pub fn for_module(module: &ClientModule) -> Self {
        let mut taken: HashSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();
        let mut names = HashMap::new();
        for decl in module.components.iter().chain(&module.inline) {
            let base = sanitize_identifier(&decl.name);
            let mut ident = base.clone();
            let mut n = 2;
            while taken.contains(&ident) {
                ident = format!("{}{}", base, n);
                n += 1;
            }
            if ident != base {
                warn!(
                    "Schema `{}` clashes with another name; declared as `{}`",
                    decl.name, ident
                );
            }
            taken.insert(ident.clone());
            names.insert(decl.name.clone(), ident);
        }
        Self { names }
    }

    /// The inferred type alias name.
    pub fn type_name(&self, name: &str) -> String {
        self.names
            .get(name)
            .cloned()
            .unwrap_or_else(|| sanitize_identifier(name))
    }

    /// `<TypeName>Schema`.
    pub fn schema(&self, name: &str) -> String {
        format!("{}Schema", self.type_name(name))
    }
}

/// Renders a validator as a zod expression. Object literals span several lines,
/// with fields indented two spaces relative to the first line.
pub fn render_validator(validator: &Validator, ids: &Identifiers) -> String {
    match validator {
        Validator::String => "z.string()".to_string(),
        Validator::Number => "z.number()".to_string(),
        Validator::Boolean => "z.boolean()".to_string(),
        Validator::Any => "z.any()".to_string(),
        Validator::Object { fields, mode } => {
            let mut out = String::from("z.object({");
            if !fields.is_empty() {
                out.push('\n');
                for field in fields {
                    let expr = render_validator(&field.validator, ids).replace('\n', "\n  ");
                    out.push_str(&format!("  {}: {},", object_key(&field.name), expr));
                    if let Some(description) = &field.description {
                        out.push_str(&format!(" // {}", single_line(description)));
                    }
                    out.push('\n');
                }
            }
            out.push_str("})");
            match mode {
                ObjectMode::Strip => {}
                ObjectMode::Strict => out.push_str(".strict()"),
                ObjectMode::Passthrough => out.push_str(".passthrough()"),
            }
            out
        }
        Validator::Array(items) => format!("z.array({})", render_validator(items, ids)),
        Validator::Union(members) => match members.as_slice() {
            [] => "z.any()".to_string(),
            [only] => render_validator(only, ids),
            _ => {
                let rendered: Vec<String> =
                    members.iter().map(|m| render_validator(m, ids)).collect();
                format!("z.union([{}])", rendered.join(", "))
            }
        },
        Validator::Nullable(inner) => format!("{}.nullable()", render_validator(inner, ids)),
        Validator::Optional(inner) => format!("{}.optional()", render_validator(inner, ids)),
        Validator::Ref { name, deferred } => {
            if *deferred {
                format!("z.lazy(() => {})", ids.schema(name))
            } else {
                ids.schema(name)
            }
        }
    }
}

fn render_declaration(w: &mut CodeWriter, decl: &SchemaDecl, ids: &Identifiers) {
    let expr = render_validator(&decl.validator, ids);
    if decl.deferred {
        w.line(format!(
            "export const {}: z.ZodType<unknown> = z.lazy(() => {});",
            ids.schema(&decl.name),
            expr
        ));
    } else {
        w.line(format!("export const {} = {};", ids.schema(&decl.name), expr));
    }
}

fn render_node(w: &mut CodeWriter, node: &ClientTreeNode, ids: &Identifiers) {
    for (method, endpoint) in &node.endpoints {
        render_endpoint(w, method, endpoint, ids);
    }
    for (key, child) in &node.children {
        w.open(format!("{}: {{", object_key(key)));
        render_node(w, child, ids);
        w.close("},");
    }
}

fn render_endpoint(w: &mut CodeWriter, key: &str, endpoint: &Endpoint, ids: &Identifiers) {
    let http_method = endpoint.http_method();
    match &endpoint.summary {
        Some(summary) => w.line(format!(
            "// {} {}: {}",
            http_method,
            endpoint.path,
            single_line(summary)
        )),
        None => w.line(format!("// {} {}", http_method, endpoint.path)),
    };

    let mut params = Vec::new();
    if let Some(query) = &endpoint.query {
        params.push(format!("query: z.input<typeof {}>", ids.schema(query)));
    }
    if let Some(body) = &endpoint.body {
        params.push(format!("body: z.input<typeof {}>", ids.schema(body)));
    }
    params.push("init?: RequestInit".to_string());
    let returns = endpoint
        .response
        .as_deref()
        .map(|name| ids.type_name(name))
        .unwrap_or_else(|| "any".to_string());

    w.open(format!(
        "{}: async ({}): Promise<{}> => {{",
        object_key(key),
        params.join(", "),
        returns
    ));

    let url_binding = if endpoint.query.is_some() { "let" } else { "const" };
    w.line(format!(
        "{} url = requireApiUrl(config) + {};",
        url_binding,
        quote(&endpoint.path)
    ));
    if let Some(query) = &endpoint.query {
        w.line(format!("const parsedQuery = {}.parse(query);", ids.schema(query)))
            .line("const search = toQueryString(parsedQuery);")
            .open("if (search) {")
            .line("url += \"?\" + search;")
            .close("}");
    }
    if let Some(body) = &endpoint.body {
        w.line(format!("const parsedBody = {}.parse(body);", ids.schema(body)));
    }

    w.open("const response = await fetch(url, {")
        .line("...init,")
        .line(format!("method: {},", quote(&http_method)))
        .open("headers: {")
        .line("\"Content-Type\": \"application/json\",")
        .line("...(config.accessToken ? { Authorization: `Bearer ${config.accessToken}` } : {}),")
        .close("},");
    if endpoint.body.is_some() {
        w.line("body: JSON.stringify(parsedBody),");
    }
    w.close("});");

    w.line("const data = await readJson(response);");
    w.open("if (response.status < 200 || response.status >= 400) {")
        .line(format!(
            "console.error({}, response.status, response.statusText, data);",
            quote(&format!("Request failed: {} {}", http_method, endpoint.path))
        ))
        .line("throw new ApiRequestError(response.status, response.statusText, data);")
        .close("}");
    match &endpoint.response {
        Some(name) => w.line(format!("return {}.parse(data);", ids.schema(name))),
        None => w.line("return data;"),
    };
    w.close("},");
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
