// src/macros.rs

/// `String` shorthand. `s!()` is empty, `s!(x)` is `String::from(x)`.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate string-ish pieces into one owned `String`.
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Build a `serde_json::Map` of document fields: `fields! { "name" => "Ann" }`.
#[macro_export]
macro_rules! fields {
    () => {
        ::serde_json::Map::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut m = ::serde_json::Map::new();
        $(
            m.insert(::std::string::String::from($key), ::serde_json::Value::from($value));
        )+
        m
    }};
}
