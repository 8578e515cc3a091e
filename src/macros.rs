/// Generates a list envelope for responses whose item list or next link use other field names
/// than the default [`ListResponse`](crate::page::ListResponse).
///
/// The generated struct implements [`PagedResponse`](crate::page::PagedResponse).
///
/// ## Example
///
/// Generating an envelope for a listing that returns `{ "images": [...], "next": "..." }`:
///
/// ```
/// use batchsvc_rs::generate_list_response;
///
/// generate_list_response!(ImageListResponse, "images", "next");
/// ```
#[macro_export]
macro_rules! generate_list_response {
    ($name:ident, $list_name:literal) => {
        $crate::generate_list_response!($name, $list_name, "odata.nextLink");
    };
    ($name:ident, $list_name:literal, $next_link_name:literal) => {
        /// List envelope of a paged response.
        #[derive(serde::Deserialize, Debug, Clone)]
        pub struct $name<T> {
            /// The list of items.
            #[serde(rename = $list_name)]
            pub list: Option<Vec<T>>,
            /// The continuation token.
            #[serde(rename = $next_link_name)]
            pub next_link: Option<$crate::page::NextLink>,
        }

        impl<T> $crate::page::PagedResponse<T> for $name<T> {
            fn into_page(self) -> $crate::page::Page<T> {
                $crate::page::Page::new(self.list.unwrap_or_default(), self.next_link)
            }
        }
    };
}
