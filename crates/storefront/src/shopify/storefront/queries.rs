//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Every document is named so the `operationName` sent alongside it always
//! matches an operation in the document.

/// A named GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation name, sent as `operationName`.
    pub name: &'static str,
    /// The GraphQL document.
    pub query: &'static str,
}

// Product queries
pub const GET_PRODUCT_BY_ID: Operation = Operation {
    name: "GetProductById",
    query: r"
query GetProductById($id: ID!) {
  product(id: $id) {
    id
    title
    handle
    description
    images(first: 1) { edges { node { url } } }
    variants(first: 1) { edges { node { id price { amount } } } }
  }
}
",
};

pub const GET_PRODUCT_BY_HANDLE: Operation = Operation {
    name: "GetProductByHandle",
    query: r"
query GetProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    title
    handle
    description
    images(first: 1) { edges { node { url } } }
    variants(first: 1) { edges { node { id price { amount } } } }
  }
}
",
};

// Collection queries
pub const GET_COLLECTIONS: Operation = Operation {
    name: "GetCollections",
    query: r"
query GetCollections {
  collections(first: 50) {
    edges {
      node {
        id
        title
        handle
        description
        image { url }
      }
    }
  }
}
",
};

/// Products of the first collection matching `$collectionTitle`
/// (a `title:<name>` search expression).
pub const GET_PRODUCTS_BY_COLLECTION: Operation = Operation {
    name: "GetProductsByCollection",
    query: r"
query GetProductsByCollection($collectionTitle: String!) {
  collections(first: 1, query: $collectionTitle) {
    edges {
      node {
        products(first: 100) {
          edges {
            node {
              id
              title
              handle
              description
              images(first: 5) { edges { node { url altText } } }
              variants(first: 10) {
                edges {
                  node {
                    id
                    title
                    price { amount currencyCode }
                    availableForSale
                  }
                }
              }
              priceRange {
                minVariantPrice { amount currencyCode }
                maxVariantPrice { amount currencyCode }
              }
            }
          }
        }
      }
    }
  }
}
",
};

// Search
pub const SEARCH_PRODUCTS: Operation = Operation {
    name: "SearchProducts",
    query: r"
query SearchProducts($q: String!) {
  products(first: 100, query: $q) {
    edges {
      node {
        id
        title
        handle
        images(first: 1) { edges { node { url } } }
        variants(first: 1) { edges { node { id price { amount } } } }
      }
    }
  }
}
",
};

// Cart hydration
pub const GET_CART_VARIANTS: Operation = Operation {
    name: "GetCartVariants",
    query: r"
query GetCartVariants($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on ProductVariant {
      id
      price { amount }
      product {
        id
        title
        handle
        images(first: 1) { edges { node { url } } }
      }
    }
  }
}
",
};

// Remote cart (checkout)
pub const CREATE_CART: Operation = Operation {
    name: "CreateCart",
    query: r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { id checkoutUrl }
    userErrors { field message }
  }
}
",
};

pub const ADD_CART_LINES: Operation = Operation {
    name: "AddCartLines",
    query: r"
mutation AddCartLines($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { id checkoutUrl }
    userErrors { field message }
  }
}
",
};

pub const GET_CART: Operation = Operation {
    name: "GetCart",
    query: r"
query GetCart($id: ID!) {
  cart(id: $id) {
    id
    checkoutUrl
  }
}
",
};
