// The cluster tag gates every deletion. Whatever else a resource carries, and whatever the
// filter says, a resource without that tag is never selected.
